//! HTTP surface of the login server.
//!
//! Serves the `/auth/*` endpoints, `/health`, and (optionally) the Prometheus
//! `/metrics` endpoint from one axum router.

pub mod auth;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::{Router, routing::get};
use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::db::Database;
use crate::security::RateLimitManager;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub rate_limiter: Arc<RateLimitManager>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        let rate_limiter = RateLimitManager::new(config.security.rate_limits.clone());
        Self {
            db,
            config: Arc::new(config),
            rate_limiter: Arc::new(rate_limiter),
        }
    }
}

/// Client address used for rate limiting.
///
/// The peer address, or the first `X-Forwarded-For` hop when
/// `server.trust_forwarded_for` is set. Falls back to `0.0.0.0` when neither
/// is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

#[axum::async_trait]
impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.config.server.trust_forwarded_for
            && let Some(ip) = parts
                .headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .and_then(|v| v.trim().parse::<IpAddr>().ok())
        {
            return Ok(ClientIp(ip));
        }

        let ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        Ok(ClientIp(ip))
    }
}

/// Handler for GET /health.
async fn health_handler() -> &'static str {
    "OK"
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_handler))
        .merge(auth::routes());

    if state.config.server.metrics_enabled {
        app = app.route("/metrics", get(metrics_handler));
    }

    app.with_state(state)
}

/// Bind the configured address and serve until SIGINT/SIGTERM.
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let addr = state.config.server.listen;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "Listening for HTTP connections");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
