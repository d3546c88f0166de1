//! Configuration sourced from process environment variables.
//!
//! Container deployments set `USE_ENVIRONMENTAL_VARIABLES=TRUE` and pass every
//! setting as a variable instead of mounting a config file.

use std::str::FromStr;

use super::defaults::{
    default_auth_attempts_per_minute, default_listen, default_min_password_length,
    default_prune_interval_secs, default_session_ttl_days,
};
use super::types::{
    Config, ConfigError, DatabaseConfig, RateLimitConfig, SecurityConfig, ServerConfig,
    SessionConfig,
};

/// Switch variable selecting the environment as configuration source.
pub const USE_ENV_VAR: &str = "USE_ENVIRONMENTAL_VARIABLES";

/// Only the exact value `TRUE` selects the environment.
pub fn uses_environment(value: Option<&str>) -> bool {
    value == Some("TRUE")
}

impl Config {
    /// Build a configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = required(&lookup, "DATABASE_PATH")?;
        let password_pepper = required(&lookup, "PASSWORD_PEPPER")?;

        Ok(Config {
            server: ServerConfig {
                listen: optional(&lookup, "LISTEN_ADDRESS", default_listen())?,
                metrics_enabled: optional_flag(&lookup, "METRICS_ENABLED", true)?,
                trust_forwarded_for: optional_flag(&lookup, "TRUST_FORWARDED_FOR", false)?,
            },
            database: DatabaseConfig { path },
            security: SecurityConfig {
                password_pepper,
                min_password_length: optional(
                    &lookup,
                    "MIN_PASSWORD_LENGTH",
                    default_min_password_length(),
                )?,
                rate_limits: RateLimitConfig {
                    auth_attempts_per_minute: optional(
                        &lookup,
                        "AUTH_ATTEMPTS_PER_MINUTE",
                        default_auth_attempts_per_minute(),
                    )?,
                },
            },
            sessions: SessionConfig {
                ttl_days: optional(&lookup, "SESSION_TTL_DAYS", default_session_ttl_days())?,
                prune_interval_secs: optional(
                    &lookup,
                    "SESSION_PRUNE_INTERVAL_SECS",
                    default_prune_interval_secs(),
                )?,
            },
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(name)),
    }
}

fn optional<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
    }
}

fn optional_flag<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv { name, value }),
    }
}
