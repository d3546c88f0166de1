//! Startup behavior of the binary: config file bootstrap and environment mode.

mod common;

use common::TestServer;
use common::server::{USE_ENV, binary_path};
use std::process::{Command, Stdio};

#[test]
fn test_missing_config_writes_example_and_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("etc/config.toml");

    let status = Command::new(binary_path())
        .arg(&path)
        .env_remove(USE_ENV)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();

    assert!(status.success());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[database]"));
    assert!(written.contains("password_pepper"));
}

#[test]
fn test_example_config_is_refused_until_edited() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let run = || {
        Command::new(binary_path())
            .arg(&path)
            .env_remove(USE_ENV)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .unwrap()
    };

    assert!(run().success());
    // Second start reads the example, whose placeholder pepper fails validation.
    assert!(!run().success());
}

#[test]
fn test_env_mode_requires_database_path() {
    let status = Command::new(binary_path())
        .env(USE_ENV, "TRUE")
        .env_remove("DATABASE_PATH")
        .env("PASSWORD_PEPPER", "pepper-from-env")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();

    assert!(!status.success());
}

#[tokio::test]
async fn test_env_mode_serves_requests() -> anyhow::Result<()> {
    let server = TestServer::spawn_from_env(18111).await?;
    let client = server.client();

    let reply = client.register("env@example.com", "long enough").await?;
    assert_eq!(reply["status"], 200);

    // METRICS_ENABLED=false unmounts the endpoint.
    let (status, _) = client.get("/metrics").await?;
    assert_eq!(status, 404);

    Ok(())
}
