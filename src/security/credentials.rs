//! Decoding and validation of submitted credentials.
//!
//! Clients send e-mail and password base64-encoded in form fields.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use zeroize::Zeroizing;

/// Longest address accepted (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// Malformed credential fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("{field} is not valid base64: {reason}")]
    Base64 { field: &'static str, reason: String },
    #[error("{field} is not valid UTF-8")]
    Utf8 { field: &'static str },
}

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r#"^(?:(?:[^<>()\[\]\\.,;:\s@"]+(?:\.[^<>()\[\]\\.,;:\s@"]+)*)|(?:".+"))@(?:(?:\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(?:(?:[a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#
    )
    .expect("email regex is valid");
}

/// Decode a standard-alphabet base64 field into a UTF-8 string.
pub fn decode_field(field: &'static str, value: &str) -> Result<String, CredentialError> {
    let bytes = STANDARD
        .decode(value.trim())
        .map_err(|e| CredentialError::Base64 {
            field,
            reason: e.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|_| CredentialError::Utf8 { field })
}

/// Decode a secret field, keeping the plaintext in zeroizing storage.
pub fn decode_secret(
    field: &'static str,
    value: &str,
) -> Result<Zeroizing<String>, CredentialError> {
    decode_field(field, value).map(Zeroizing::new)
}

/// Whether `email` looks like a deliverable address.
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && EMAIL_REGEX.is_match(email)
}
