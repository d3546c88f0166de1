//! twinsight-login-server - account and session service for Twinsight.
//!
//! Accepts base64-encoded credentials over url-encoded forms, stores argon2
//! hashes in SQLite and hands out opaque session IDs.

mod config;
mod db;
mod error;
mod http;
mod maintenance;
mod metrics;
mod security;
mod telemetry;

use crate::config::{Loaded, USE_ENV_VAR};
use crate::db::Database;
use crate::http::AppState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let use_env = std::env::var(USE_ENV_VAR).ok();
    let loaded = config::resolve(use_env.as_deref(), std::env::args().nth(1)).map_err(|e| {
        error!(error = %e, "Failed to load config");
        e
    })?;

    let (config, source) = match loaded {
        Loaded::Ready { config, source } => (config, source),
        Loaded::ExampleWritten(path) => {
            info!(
                path = %path.display(),
                "No configuration found. An example was written; edit it and restart"
            );
            return Ok(());
        }
    };

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("Refusing to start with {} configuration error(s)", errors.len());
    }

    info!(
        source = %source,
        listen = %config.server.listen,
        "Starting twinsight-login-server"
    );

    // Initialize database
    let db = Database::new(&config.database.path).await.map_err(|e| {
        error!(path = %config.database.path, error = %e, "Failed to open database");
        e
    })?;
    info!(path = %config.database.path, "Database ready");

    if config.server.metrics_enabled {
        metrics::init();
        info!("Metrics initialized");
    } else {
        info!("Metrics disabled");
    }

    let prune_interval = config.sessions.prune_interval();
    let state = AppState::new(db, config);

    let pruner = maintenance::spawn_session_pruner(
        state.db.clone(),
        state.rate_limiter.clone(),
        prune_interval,
    );
    info!(interval_secs = prune_interval.as_secs(), "Session pruner started");

    let served = http::serve(state).await;
    pruner.abort();
    served?;

    info!("Server stopped");
    Ok(())
}
