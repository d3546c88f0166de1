//! Password hashing and verification utilities.
//!
//! Argon2id with the server pepper supplied as the Argon2 secret. The salt is
//! random per hash and stored inside the PHC string.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use std::sync::OnceLock;
use thiserror::Error;

/// Password hashing errors.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("unusable pepper: {0}")]
    Pepper(argon2::Error),
    #[error("password hash error: {0}")]
    Hash(argon2::password_hash::Error),
}

fn hasher(pepper: &str) -> Result<Argon2<'_>, PasswordError> {
    Argon2::new_with_secret(
        pepper.as_bytes(),
        Algorithm::Argon2id,
        Version::V0x13,
        Params::default(),
    )
    .map_err(PasswordError::Pepper)
}

/// Hash a password with the given pepper.
pub fn hash_password(password: &str, pepper: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(hasher(pepper)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?
        .to_string())
}

/// Verify a password against a stored hash.
///
/// `Ok(false)` means the password is wrong; `Err` means the stored hash or
/// the pepper is unusable.
pub fn verify_password(password: &str, hash: &str, pepper: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(PasswordError::Hash)?;
    Ok(hasher(pepper)?
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Burn the cost of one verification against a hash that never matches.
///
/// Used when the account does not exist so the response time matches a wrong
/// password.
pub fn dummy_verify(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let hash = DUMMY_HASH.get_or_init(|| {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(b"timing-oracle-dummy", &salt)
            .ok()
            .map(|h| h.to_string())
    });

    if let Some(hash) = hash
        && let Ok(parsed) = PasswordHash::new(hash)
    {
        let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
    }
}
