//! Background housekeeping.
//!
//! Expired sessions are never served (lookups check the expiry), but their rows
//! are only removed here or when a client presents one.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

use crate::db::{Database, DbError};
use crate::security::RateLimitManager;
use crate::telemetry::spans;

/// Prune expired sessions once and refresh the session gauges.
pub async fn sweep_sessions(db: &Database) -> Result<u64, DbError> {
    let now = chrono::Utc::now().timestamp();
    let sessions = db.sessions();

    let removed = sessions.prune_expired(now).await?;
    let active = sessions.count_active(now).await?;
    crate::metrics::record_sweep(removed, active);

    Ok(removed)
}

/// Spawn the periodic sweep: once at startup, then every `interval`.
pub fn spawn_session_pruner(
    db: Database,
    rate_limiter: Arc<RateLimitManager>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            // The first tick completes immediately.
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match sweep_sessions(&db).await {
                    Ok(removed) if removed > 0 => {
                        info!(removed = removed, "Expired sessions pruned");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Failed to prune expired sessions");
                    }
                }
                rate_limiter.cleanup();
                debug!(
                    auth_limiters = rate_limiter.stats().auth_limiters,
                    "Rate limiter state after cleanup"
                );
            }
        }
        .instrument(spans::maintenance("session_pruner")),
    )
}
