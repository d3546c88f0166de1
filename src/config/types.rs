//! Core configuration types and loading.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_auth_attempts_per_minute, default_listen, default_min_password_length,
    default_prune_interval_secs, default_session_ttl_days, default_true,
};

/// Placeholder pepper written into the example configuration.
///
/// Validation refuses to start with it.
pub const EXAMPLE_PEPPER: &str = "CHANGE_ME_TO_A_LONG_RANDOM_SECRET";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("required environment variable '{0}' is not set")]
    MissingEnv(&'static str),
    #[error("environment variable '{name}' has an invalid value: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Login server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Password hashing and abuse protection.
    pub security: SecurityConfig,
    /// Session lifetime and housekeeping.
    #[serde(default)]
    pub sessions: SessionConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: "0.0.0.0:8080").
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Serve Prometheus metrics on `/metrics` (default: true).
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
    /// Take the client address from the first `X-Forwarded-For` entry.
    /// Only enable behind a reverse proxy that overwrites the header.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            metrics_enabled: true,
            trust_forwarded_for: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file, or ":memory:".
    pub path: String,
}

/// Security configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Server-side secret bound into every password hash.
    pub password_pepper: String,
    /// Minimum password length in characters accepted at registration.
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
    /// Rate limiting for login and registration.
    #[serde(default)]
    pub rate_limits: RateLimitConfig,
}

/// Rate limit configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Login/registration attempts allowed per client IP per minute.
    #[serde(default = "default_auth_attempts_per_minute")]
    pub auth_attempts_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_attempts_per_minute: default_auth_attempts_per_minute(),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Days a session stays valid after it is issued (default: 30).
    #[serde(default = "default_session_ttl_days")]
    pub ttl_days: u32,
    /// Seconds between expired-session sweeps (default: 3600).
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_days: default_session_ttl_days(),
            prune_interval_secs: default_prune_interval_secs(),
        }
    }
}

impl SessionConfig {
    /// Session lifetime.
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.ttl_days))
    }

    /// Interval of the expired-session sweep.
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs.max(1))
    }
}

/// Platform-specific location of the configuration file.
///
/// Unsupported platforms keep the file next to the executable.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let path = match std::env::consts::OS {
        "linux" | "freebsd" => PathBuf::from("/etc/twinsight-login-server/config.toml"),
        "windows" => PathBuf::from(r"C:\Program Files\TwinsightLoginServer\config.toml"),
        other => {
            tracing::warn!(
                os = other,
                "Platform is not officially supported; using the executable's directory for config.toml"
            );
            let exe = std::env::current_exe()?;
            exe.parent()
                .map(|dir| dir.join("config.toml"))
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        }
    };
    Ok(path)
}

/// Example configuration written on first start.
pub fn example_config() -> String {
    format!(
        r#"# Twinsight login server configuration.
# Edit this file, then restart the server.

[server]
listen = "0.0.0.0:8080"
metrics_enabled = true
trust_forwarded_for = false

[database]
path = "/var/lib/twinsight-login-server/login.db"

[security]
# Generate with: openssl rand -hex 32
password_pepper = "{EXAMPLE_PEPPER}"
min_password_length = 8

[security.rate_limits]
auth_attempts_per_minute = 10

[sessions]
ttl_days = 30
prune_interval_secs = 3600
"#
    )
}

/// Create the parent directory of `path` and write the example config into it.
pub fn write_example_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, example_config())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: Config = toml::from_str(
            r#"
[database]
path = "login.db"

[security]
password_pepper = "pepper"
"#,
        )
        .unwrap();

        assert_eq!(config.server.listen, default_listen());
        assert!(config.server.metrics_enabled);
        assert!(!config.server.trust_forwarded_for);
        assert_eq!(config.security.min_password_length, 8);
        assert_eq!(config.security.rate_limits.auth_attempts_per_minute, 10);
        assert_eq!(config.sessions.ttl_days, 30);
        assert_eq!(config.sessions.ttl(), chrono::Duration::days(30));
    }

    #[test]
    fn test_missing_pepper_is_a_parse_error() {
        let result: Result<Config, _> = toml::from_str(
            r#"
[database]
path = "login.db"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(&example_config()).unwrap();
        assert_eq!(config.security.password_pepper, EXAMPLE_PEPPER);
        assert_eq!(config.server.listen.port(), 8080);
    }

    #[test]
    fn test_write_example_config_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/config.toml");

        write_example_config(&path).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.security.password_pepper, EXAMPLE_PEPPER);
    }
}
