//! Prometheus metrics collection for the login server.
//!
//! Exposed on `/metrics` when `server.metrics_enabled` is set.
//!
//! - `auth_requests_total{endpoint,status}` - Requests by endpoint and reply status
//! - `auth_request_duration_seconds{endpoint}` - Request latency histogram
//! - `auth_errors_total{endpoint,error}` - Failed requests by error kind
//! - `auth_rate_limited_total` - Credential attempts refused by the rate limiter
//! - `auth_sessions_pruned_total` - Expired sessions removed by maintenance
//! - `auth_active_sessions` - Valid sessions at the last maintenance sweep

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Requests by endpoint and reply status.
pub static REQUESTS: OnceLock<IntCounterVec> = OnceLock::new();

/// Failed requests by endpoint and error code.
pub static ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Credential attempts refused by the rate limiter.
pub static RATE_LIMITED: OnceLock<IntCounter> = OnceLock::new();

/// Expired sessions removed by maintenance.
pub static SESSIONS_PRUNED: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

/// Valid sessions at the last maintenance sweep.
pub static ACTIVE_SESSIONS: OnceLock<IntGauge> = OnceLock::new();

/// Request latency by endpoint.
pub static REQUEST_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(REQUESTS, IntCounterVec::new(Opts::new("auth_requests_total", "Auth requests by endpoint and reply status"), &["endpoint", "status"]));
    register!(ERRORS, IntCounterVec::new(Opts::new("auth_errors_total", "Failed auth requests by error kind"), &["endpoint", "error"]));
    register!(RATE_LIMITED, IntCounter::new("auth_rate_limited_total", "Credential attempts refused by the rate limiter"));
    register!(SESSIONS_PRUNED, IntCounter::new("auth_sessions_pruned_total", "Expired sessions removed"));
    register!(ACTIVE_SESSIONS, IntGauge::new("auth_active_sessions", "Valid sessions at the last sweep"));
    register!(REQUEST_LATENCY, HistogramVec::new(
        HistogramOpts::new("auth_request_duration_seconds", "Auth request latency by endpoint")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        &["endpoint"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record a completed request with the status carried in its reply body.
#[inline]
pub fn record_outcome(endpoint: &str, status: i16) {
    if let Some(c) = REQUESTS.get() {
        let status = status.to_string();
        c.with_label_values(&[endpoint, status.as_str()]).inc();
    }
}

/// Record a failed request.
#[inline]
pub fn record_error(endpoint: &str, error: &str) {
    if let Some(c) = ERRORS.get() {
        c.with_label_values(&[endpoint, error]).inc();
    }
}

/// Record request latency.
#[inline]
pub fn record_latency(endpoint: &str, duration_secs: f64) {
    if let Some(h) = REQUEST_LATENCY.get() {
        h.with_label_values(&[endpoint]).observe(duration_secs);
    }
}

/// Record a rate-limited credential attempt.
#[inline]
pub fn record_rate_limited() {
    if let Some(c) = RATE_LIMITED.get() {
        c.inc();
    }
}

/// Record a maintenance sweep.
#[inline]
pub fn record_sweep(pruned: u64, active: i64) {
    if let Some(c) = SESSIONS_PRUNED.get() {
        c.inc_by(pruned);
    }
    if let Some(g) = ACTIVE_SESSIONS.get() {
        g.set(active);
    }
}
