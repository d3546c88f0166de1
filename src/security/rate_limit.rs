//! Rate limiting for credential endpoints.
//!
//! Provides governor-based per-IP limiting of login and registration
//! attempts.
//!
//! # Architecture
//!
//! Uses the `governor` crate's token bucket algorithm. Each client IP gets
//! its own bucket refilled at `auth_attempts_per_minute`, with a burst of the
//! same size.

use crate::config::RateLimitConfig;
use dashmap::DashMap;
use governor::{Quota, RateLimiter as GovRateLimiter};
use nonzero_ext::nonzero;
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

/// Type alias for governor's direct rate limiter.
type DirectRateLimiter = governor::DefaultDirectRateLimiter;

/// Thread-safe rate limit manager using governor.
#[derive(Debug)]
pub struct RateLimitManager {
    /// Per-IP login/registration limiters.
    auth_limiters: DashMap<IpAddr, DirectRateLimiter>,
    /// Configuration values.
    config: Arc<RateLimitConfig>,
}

impl RateLimitManager {
    /// Create a new rate limit manager with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            auth_limiters: DashMap::new(),
            config: Arc::new(config),
        }
    }

    /// Check if an IP may attempt a login or registration.
    ///
    /// Returns `true` if allowed, `false` if rate limited.
    pub fn check_auth_attempt(&self, ip: IpAddr) -> bool {
        let limiter = self.auth_limiters.entry(ip).or_insert_with(|| {
            let per_minute =
                NonZeroU32::new(self.config.auth_attempts_per_minute).unwrap_or(nonzero!(10u32));
            GovRateLimiter::direct(Quota::per_minute(per_minute).allow_burst(per_minute))
        });

        let allowed = limiter.check().is_ok();
        if !allowed {
            debug!(ip = %ip, "auth attempt rate limit exceeded");
        }
        allowed
    }

    /// Cleanup old entries to prevent memory growth.
    ///
    /// Called periodically from the maintenance task.
    pub fn cleanup(&self) {
        // Buckets are not access-timestamped; past the cap they are all dropped.
        const MAX_ENTRIES: usize = 10_000;

        if self.auth_limiters.len() > MAX_ENTRIES {
            self.auth_limiters.clear();
            debug!("cleared auth rate limiters (exceeded {} entries)", MAX_ENTRIES);
        }
    }

    /// Get current statistics.
    pub fn stats(&self) -> RateLimitStats {
        RateLimitStats {
            auth_limiters: self.auth_limiters.len(),
        }
    }
}

impl Default for RateLimitManager {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Rate limiter statistics.
#[derive(Debug, Clone)]
pub struct RateLimitStats {
    /// Number of tracked client IPs.
    pub auth_limiters: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RateLimitConfig {
        RateLimitConfig {
            auth_attempts_per_minute: 3,
        }
    }

    #[test]
    fn test_auth_rate_limiting() {
        let manager = RateLimitManager::new(test_config());
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        // First 3 attempts should be allowed (burst of 3)
        assert!(manager.check_auth_attempt(ip));
        assert!(manager.check_auth_attempt(ip));
        assert!(manager.check_auth_attempt(ip));

        // Fourth should be rate limited
        assert!(!manager.check_auth_attempt(ip));
    }

    #[test]
    fn test_different_ips_independent() {
        let manager = RateLimitManager::new(test_config());
        let ip1: IpAddr = "10.0.0.1".parse().unwrap();
        let ip2: IpAddr = "10.0.0.2".parse().unwrap();

        for _ in 0..3 {
            manager.check_auth_attempt(ip1);
        }
        assert!(!manager.check_auth_attempt(ip1));

        // ip2 should still be allowed
        assert!(manager.check_auth_attempt(ip2));
        assert_eq!(manager.stats().auth_limiters, 2);
    }

    #[test]
    fn test_zero_budget_falls_back_to_default() {
        let manager = RateLimitManager::new(RateLimitConfig {
            auth_attempts_per_minute: 0,
        });
        let ip: IpAddr = "::1".parse().unwrap();

        for _ in 0..10 {
            assert!(manager.check_auth_attempt(ip));
        }
        assert!(!manager.check_auth_attempt(ip));
    }

    #[test]
    fn test_cleanup_keeps_small_tables() {
        let manager = RateLimitManager::default();
        manager.check_auth_attempt("127.0.0.1".parse().unwrap());
        manager.cleanup();
        assert_eq!(manager.stats().auth_limiters, 1);
    }
}
