use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::{Form, Json};
use serde::Deserialize;
use tracing::{Instrument, debug, info};

use super::{GrantResponse, STATUS_TOO_MANY, STATUS_UNAUTHORIZED, finish, form_body};
use crate::db::DbError;
use crate::error::ApiError;
use crate::http::{AppState, ClientIp};
use crate::metrics;
use crate::security::credentials::{decode_field, decode_secret};
use crate::telemetry::{RequestTimer, spans};

const ENDPOINT: &str = "login";

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(alias = "username_base64")]
    email_base64: String,
    password_base64: String,
}

/// `POST /auth/login`: exchange credentials for a new session.
pub async fn post_login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<GrantResponse>, ApiError> {
    let _timer = RequestTimer::new(ENDPOINT);
    let result = login(&state, ip, form)
        .instrument(spans::request(ENDPOINT, ip))
        .await;
    finish(ENDPOINT, result)
}

async fn login(
    state: &AppState,
    ip: std::net::IpAddr,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<GrantResponse, ApiError> {
    let form = form_body(form)?;

    if !state.rate_limiter.check_auth_attempt(ip) {
        metrics::record_rate_limited();
        return Ok(GrantResponse::refused(STATUS_TOO_MANY, "Too many attempts."));
    }

    let email = decode_field("email_base64", &form.email_base64)?;
    let password = decode_secret("password_base64", &form.password_base64)?;

    let identified = state
        .db
        .accounts()
        .identify(&email, &password, &state.config.security.password_pepper)
        .await;

    let account = match identified {
        Ok(account) => account,
        // Unknown account and wrong password share one reply.
        Err(e @ (DbError::AccountNotFound(_) | DbError::InvalidPassword)) => {
            debug!(reason = %e, "Login refused");
            return Ok(GrantResponse::refused(
                STATUS_UNAUTHORIZED,
                "Invalid credentials.",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let session = state
        .db
        .sessions()
        .create(&account.user_id, state.config.sessions.ttl())
        .await?;

    info!(user_id = %account.user_id, "Login succeeded");
    Ok(GrantResponse::granted(session.session_id, session.expiry))
}
