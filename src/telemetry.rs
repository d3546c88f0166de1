//! Telemetry utilities for request timing and tracing spans.

use std::time::Instant;

/// Guard for timing request handling and recording metrics.
///
/// Records request latency when dropped.
pub struct RequestTimer {
    endpoint: &'static str,
    start: Instant,
}

impl RequestTimer {
    /// Start timing a request.
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            start: Instant::now(),
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_latency(self.endpoint, duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use std::net::IpAddr;
    use tracing::{Span, info_span};

    /// Create a span for an auth request.
    pub fn request(endpoint: &str, client_ip: IpAddr) -> Span {
        info_span!("request", endpoint = %endpoint, ip = %client_ip)
    }

    /// Create a span for a maintenance sweep.
    pub fn maintenance(task: &str) -> Span {
        info_span!("maintenance", task = %task)
    }
}
