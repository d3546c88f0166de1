//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::{Ipv4Addr, SocketAddr};

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Server Defaults
// =============================================================================

/// The container contract exposes 8080 on all interfaces.
pub fn default_listen() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

// =============================================================================
// Security Defaults
// =============================================================================

pub fn default_min_password_length() -> usize {
    8
}

pub fn default_auth_attempts_per_minute() -> u32 {
    10
}

// =============================================================================
// Session Defaults
// =============================================================================

pub fn default_session_ttl_days() -> u32 {
    30
}

pub fn default_prune_interval_secs() -> u64 {
    3600
}
