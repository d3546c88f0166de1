//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use super::types::EXAMPLE_PEPPER;
use std::path::Path;
use thiserror::Error;

/// Longest accepted session lifetime (about a century).
pub const MAX_SESSION_TTL_DAYS: u32 = 36_500;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("security.password_pepper is required")]
    MissingPepper,
    #[error("security.password_pepper is still the example placeholder")]
    ExamplePepper,
    #[error("security.min_password_length must be at least 1")]
    InvalidMinPasswordLength,
    #[error("security.rate_limits.auth_attempts_per_minute must be at least 1")]
    InvalidAuthRate,
    #[error("sessions.ttl_days must be between 1 and {MAX_SESSION_TTL_DAYS}")]
    InvalidSessionTtl,
    #[error("database.path is required")]
    MissingDatabasePath,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let pepper = &config.security.password_pepper;
    if pepper.is_empty() {
        errors.push(ValidationError::MissingPepper);
    } else if pepper == EXAMPLE_PEPPER {
        errors.push(ValidationError::ExamplePepper);
    }

    if config.security.min_password_length == 0 {
        errors.push(ValidationError::InvalidMinPasswordLength);
    }
    if config.security.rate_limits.auth_attempts_per_minute == 0 {
        errors.push(ValidationError::InvalidAuthRate);
    }
    if !(1..=MAX_SESSION_TTL_DAYS).contains(&config.sessions.ttl_days) {
        errors.push(ValidationError::InvalidSessionTtl);
    }

    // Database path validation
    let db_path = &config.database.path;
    if db_path.is_empty() {
        errors.push(ValidationError::MissingDatabasePath);
    } else if db_path != ":memory:"
        && let Some(parent) = Path::new(db_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::DatabasePathInvalid(db_path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
