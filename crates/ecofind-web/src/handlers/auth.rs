//! Admin login, logout and session lookup

use crate::{
    error::ApiResult,
    extractors::{AdminSession, ValidatedJson},
    state::AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use ecofind_core::{types::LoginRequest, Session, User};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Session summary returned to the console
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// The logged-in administrator
    pub user: User,
}

/// Answer to a successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginAccepted {
    /// Console token to send as `Authorization: Bearer` on console calls
    pub token: String,
    /// The logged-in administrator
    pub user: User,
}

/// Authenticate against the backend and keep the admin session
///
/// The backend token stays on the server; the caller gets a fresh console
/// token instead. Logging in again replaces the previous console token.
///
/// # Errors
///
/// Returns 401 for bad credentials or a non-admin account, 502/504 when the
/// backend cannot be reached.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(credentials): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginAccepted>> {
    let response = state.backend.login(&credentials).await?;
    info!(user = %response.user.email, "Admin logged in");

    let console_token = Uuid::new_v4().to_string();
    let session = Session {
        token: response.token,
        user: response.user,
        console_token: Some(console_token.clone()),
    };
    let user = session.user.clone();
    state.set_session(session);
    Ok(Json(LoginAccepted {
        token: console_token,
        user,
    }))
}

/// End the admin session
pub async fn logout(State(state): State<Arc<AppState>>, _admin: AdminSession) -> StatusCode {
    state.clear_session().await;
    StatusCode::NO_CONTENT
}

/// Current admin session
///
/// # Errors
///
/// Returns 401 when nobody is logged in.
pub async fn current_session(
    AdminSession(session): AdminSession,
) -> ApiResult<Json<SessionResponse>> {
    Ok(Json(SessionResponse { user: session.user }))
}
