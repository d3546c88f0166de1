//! Security module for the login server.
//!
//! Provides:
//! - **Password**: Argon2id hashing with a server-side pepper
//! - **Credentials**: base64 form-field decoding and e-mail validation
//! - **Tokens**: random user and session identifiers
//! - **Rate Limiting**: Governor-based per-IP limits on credential attempts

pub mod credentials;
pub mod password;
pub mod rate_limit;
pub mod tokens;

pub use credentials::CredentialError;
pub use password::PasswordError;
pub use rate_limit::RateLimitManager;
