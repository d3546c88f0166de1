use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use super::{STATUS_OK, STATUS_UNAUTHORIZED, StatusReply, finish, form_body};
use crate::error::ApiError;
use crate::http::AppState;
use crate::telemetry::RequestTimer;

const ENDPOINT: &str = "logout";

#[derive(Deserialize)]
pub struct LogoutForm {
    session_id: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub status: i16,
}

impl StatusReply for LogoutResponse {
    fn status(&self) -> i16 {
        self.status
    }
}

/// `POST /auth/logout`: revoke a session.
pub async fn post_logout(
    State(state): State<AppState>,
    form: Result<Form<LogoutForm>, FormRejection>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let _timer = RequestTimer::new(ENDPOINT);
    finish(ENDPOINT, logout(&state, form).await)
}

async fn logout(
    state: &AppState,
    form: Result<Form<LogoutForm>, FormRejection>,
) -> Result<LogoutResponse, ApiError> {
    let form = form_body(form)?;
    let removed = state.db.sessions().delete(&form.session_id).await?;
    Ok(LogoutResponse {
        status: if removed { STATUS_OK } else { STATUS_UNAUTHORIZED },
    })
}
