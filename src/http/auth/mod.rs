//! `/auth/*` endpoints.
//!
//! Every endpoint takes a url-encoded form and answers HTTP 200 with a JSON
//! body whose `status` field carries the outcome. Malformed input is HTTP 400
//! and internal failures are HTTP 500 (see [`ApiError`]).

mod login;
mod logout;
mod register;
mod session;

use login::post_login;
use logout::post_logout;
use register::post_register;
use session::post_session;

use axum::extract::rejection::FormRejection;
use axum::{Form, Json, Router, routing::post};
use serde::Serialize;

use super::AppState;
use crate::error::ApiError;
use crate::metrics;

pub const STATUS_OK: i16 = 200;
pub const STATUS_BAD_REQUEST: i16 = 400;
pub const STATUS_UNAUTHORIZED: i16 = 401;
pub const STATUS_CONFLICT: i16 = 409;
pub const STATUS_TOO_MANY: i16 = 429;

/// Routes for the auth endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(post_register))
        .route("/auth/login", post(post_login))
        .route("/auth/session", post(post_session))
        .route("/auth/logout", post(post_logout))
}

/// A reply that carries a domain status code.
pub trait StatusReply: Serialize {
    fn status(&self) -> i16;
}

/// Reply of endpoints that hand out a session (register, login).
#[derive(Debug, Serialize)]
pub struct GrantResponse {
    pub status: i16,
    pub message: Option<&'static str>,
    pub session_id: Option<String>,
    pub expiry: Option<i64>,
}

impl GrantResponse {
    pub fn granted(session_id: String, expiry: i64) -> Self {
        Self {
            status: STATUS_OK,
            message: None,
            session_id: Some(session_id),
            expiry: Some(expiry),
        }
    }

    pub fn refused(status: i16, message: &'static str) -> Self {
        Self {
            status,
            message: Some(message),
            session_id: None,
            expiry: None,
        }
    }
}

impl StatusReply for GrantResponse {
    fn status(&self) -> i16 {
        self.status
    }
}

/// Unwrap a form body, turning axum's rejection into an HTTP 400.
fn form_body<T>(form: Result<Form<T>, FormRejection>) -> Result<T, ApiError> {
    form.map(|Form(body)| body).map_err(ApiError::from)
}

/// Record the outcome of a handler and wrap a successful reply as JSON.
fn finish<T: StatusReply>(
    endpoint: &'static str,
    result: Result<T, ApiError>,
) -> Result<Json<T>, ApiError> {
    match result {
        Ok(reply) => {
            metrics::record_outcome(endpoint, reply.status());
            Ok(Json(reply))
        }
        Err(e) => {
            metrics::record_error(endpoint, e.error_code());
            Err(e)
        }
    }
}
