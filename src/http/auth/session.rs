use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use super::{STATUS_OK, STATUS_UNAUTHORIZED, StatusReply, finish, form_body};
use crate::error::ApiError;
use crate::http::AppState;
use crate::telemetry::RequestTimer;

const ENDPOINT: &str = "session";

#[derive(Deserialize)]
pub struct SessionForm {
    session_id: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub status: i16,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub message: Option<&'static str>,
}

impl SessionResponse {
    fn unauthorized(message: &'static str) -> Self {
        Self {
            status: STATUS_UNAUTHORIZED,
            user_id: None,
            email: None,
            message: Some(message),
        }
    }
}

impl StatusReply for SessionResponse {
    fn status(&self) -> i16 {
        self.status
    }
}

/// `POST /auth/session`: resolve a session to its account.
pub async fn post_session(
    State(state): State<AppState>,
    form: Result<Form<SessionForm>, FormRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let _timer = RequestTimer::new(ENDPOINT);
    let result = match form_body(form) {
        Ok(form) => check_session(&state, &form.session_id).await,
        Err(e) => Err(e),
    };
    finish(ENDPOINT, result)
}

async fn check_session(state: &AppState, session_id: &str) -> Result<SessionResponse, ApiError> {
    let sessions = state.db.sessions();

    let Some(session) = sessions.find(session_id).await? else {
        return Ok(SessionResponse::unauthorized("Session ID not found."));
    };

    if session.is_expired_at(chrono::Utc::now().timestamp()) {
        sessions.delete(&session.session_id).await?;
        return Ok(SessionResponse::unauthorized("Session expired"));
    }

    let Some(account) = state.db.accounts().find_by_id(&session.user_id).await? else {
        return Ok(SessionResponse::unauthorized("Session ID not found."));
    };

    Ok(SessionResponse {
        status: STATUS_OK,
        user_id: Some(account.user_id),
        email: Some(account.email),
        message: None,
    })
}
