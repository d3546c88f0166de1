//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions, TOML loading and the example file
//! - [`env`]: Environment-variable configuration source
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup validation

mod defaults;
mod env;
mod types;
mod validation;

pub use env::USE_ENV_VAR;
pub use types::{Config, ConfigError, RateLimitConfig};
pub use validation::validate;

use env::uses_environment;
use types::{default_config_path, write_example_config};

use std::path::PathBuf;

/// Outcome of resolving the configuration at startup.
#[derive(Debug)]
pub enum Loaded {
    /// Configuration is ready to use.
    Ready { config: Config, source: String },
    /// No config file existed; an example was written and must be edited first.
    ExampleWritten(PathBuf),
}

/// Resolve the configuration source and load it.
///
/// `use_env` is the raw value of [`USE_ENV_VAR`]. `cli_path` overrides the
/// platform default file location.
pub fn resolve(use_env: Option<&str>, cli_path: Option<String>) -> Result<Loaded, ConfigError> {
    if uses_environment(use_env) {
        return Ok(Loaded::Ready {
            config: Config::from_env()?,
            source: "environment".to_string(),
        });
    }

    let path = match cli_path {
        Some(path) => PathBuf::from(path),
        None => default_config_path()?,
    };

    if !path.exists() {
        write_example_config(&path)?;
        return Ok(Loaded::ExampleWritten(path));
    }

    let config = Config::load(&path)?;
    Ok(Loaded::Ready {
        config,
        source: path.display().to_string(),
    })
}
