//! Unified error handling for the HTTP layer.
//!
//! Domain outcomes (wrong password, unknown session, ...) are not errors: they
//! travel as a `status` field in a 200 reply. `ApiError` covers requests that
//! could not be processed at all.

use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::db::DbError;
use crate::security::CredentialError;

/// Errors that abort request handling.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Form(#[from] FormRejection),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("database error: {0}")]
    Database(#[from] DbError),
}

impl ApiError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Form(_) => "bad_form",
            Self::Credentials(CredentialError::Base64 { .. }) => "bad_base64",
            Self::Credentials(CredentialError::Utf8 { .. }) => "bad_utf8",
            Self::Database(DbError::Password(_)) => "password_hash",
            Self::Database(_) => "database",
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Form(_) | Self::Credentials(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            // Malformed input: tell the client what was wrong.
            Self::Form(e) => (status, e.body_text()).into_response(),
            Self::Credentials(e) => (status, e.to_string()).into_response(),
            // Internal failures are logged, never echoed.
            Self::Database(e) => {
                tracing::error!(error = %e, "Request failed");
                status.into_response()
            }
        }
    }
}
