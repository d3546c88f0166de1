//! Test server management.
//!
//! Spawns and manages login server instances for integration testing.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Environment switch read by the server binary.
pub const USE_ENV: &str = "USE_ENVIRONMENTAL_VARIABLES";

pub const TEST_PEPPER: &str = "integration-test-pepper-0f3c9a";

/// Path to the compiled server binary.
pub fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_login_server"))
}

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    _data_dir: TempDir,
}

impl TestServer {
    /// Spawn a server configured from a TOML file.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        Self::spawn_with_limits(port, 1000).await
    }

    /// Spawn a server with a custom credential attempt budget.
    pub async fn spawn_with_limits(port: u16, auth_attempts_per_minute: u32) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let config_path = data_dir.path().join("config.toml");
        let config_content = format!(
            r#"
[server]
listen = "127.0.0.1:{port}"
metrics_enabled = true

[database]
path = "{db}"

[security]
password_pepper = "{TEST_PEPPER}"
min_password_length = 8

[security.rate_limits]
auth_attempts_per_minute = {auth_attempts_per_minute}
"#,
            db = db_path(data_dir.path()),
        );
        std::fs::write(&config_path, config_content)?;

        let child = Command::new(binary_path())
            .arg(&config_path)
            .env_remove(USE_ENV)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            port,
            _data_dir: data_dir,
        };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Spawn a server configured purely from environment variables.
    pub async fn spawn_from_env(port: u16) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;

        let child = Command::new(binary_path())
            .env(USE_ENV, "TRUE")
            .env("DATABASE_PATH", db_path(data_dir.path()))
            .env("PASSWORD_PEPPER", TEST_PEPPER)
            .env("LISTEN_ADDRESS", format!("127.0.0.1:{port}"))
            .env("METRICS_ENABLED", "false")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            port,
            _data_dir: data_dir,
        };
        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until `/health` answers.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if let Ok(resp) = client.get(self.url("/health")).send().await
                && resp.status().is_success()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// Create a client bound to this server.
    pub fn client(&self) -> super::client::AuthClient {
        super::client::AuthClient::new(self.url(""))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn db_path(dir: &Path) -> String {
    // Forward slashes keep the path valid inside a TOML basic string.
    dir.join("login.db").display().to_string().replace('\\', "/")
}
