use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::{Form, Json};
use serde::Deserialize;
use tracing::{Instrument, info};

use super::{
    GrantResponse, STATUS_BAD_REQUEST, STATUS_CONFLICT, STATUS_TOO_MANY, finish, form_body,
};
use crate::db::DbError;
use crate::error::ApiError;
use crate::http::{AppState, ClientIp};
use crate::metrics;
use crate::security::credentials::{decode_field, decode_secret, is_valid_email};
use crate::telemetry::{RequestTimer, spans};

const ENDPOINT: &str = "register";

#[derive(Deserialize)]
pub struct RegisterForm {
    email_base64: String,
    password_base64: String,
}

/// `POST /auth/register`: create an account and log it in.
pub async fn post_register(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<Json<GrantResponse>, ApiError> {
    let _timer = RequestTimer::new(ENDPOINT);
    let result = register(&state, ip, form)
        .instrument(spans::request(ENDPOINT, ip))
        .await;
    finish(ENDPOINT, result)
}

async fn register(
    state: &AppState,
    ip: std::net::IpAddr,
    form: Result<Form<RegisterForm>, FormRejection>,
) -> Result<GrantResponse, ApiError> {
    let form = form_body(form)?;

    if !state.rate_limiter.check_auth_attempt(ip) {
        metrics::record_rate_limited();
        return Ok(GrantResponse::refused(STATUS_TOO_MANY, "Too many attempts."));
    }

    let email = decode_field("email_base64", &form.email_base64)?;
    let password = decode_secret("password_base64", &form.password_base64)?;

    if !is_valid_email(&email) {
        return Ok(GrantResponse::refused(
            STATUS_BAD_REQUEST,
            "Invalid E-mail address.",
        ));
    }

    if password.chars().count() < state.config.security.min_password_length {
        return Ok(GrantResponse::refused(
            STATUS_BAD_REQUEST,
            "Password too short.",
        ));
    }

    let registered = state
        .db
        .accounts()
        .register(
            &email,
            &password,
            &state.config.security.password_pepper,
            state.config.sessions.ttl(),
        )
        .await;

    match registered {
        Ok((account, session)) => {
            info!(user_id = %account.user_id, "Account registered");
            Ok(GrantResponse::granted(session.session_id, session.expiry))
        }
        Err(DbError::AccountExists(_)) => Ok(GrantResponse::refused(
            STATUS_CONFLICT,
            "Account already exists.",
        )),
        Err(e) => Err(e.into()),
    }
}
