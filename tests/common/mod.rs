//! Integration test common infrastructure.
//!
//! Provides utilities for spawning the login server binary and talking to it
//! over HTTP.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::AuthClient;
#[allow(unused_imports)]
pub use server::TestServer;
