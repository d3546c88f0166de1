//! Random identifiers for users and sessions.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of session identifiers.
pub const SESSION_ID_LEN: usize = 64;

/// Length of user identifiers.
pub const USER_ID_LEN: usize = 64;

/// Generate an alphanumeric token of `len` characters.
pub fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
