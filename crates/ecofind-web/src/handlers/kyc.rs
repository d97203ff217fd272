//! KYC review screen: user listing and document approval

use crate::{
    error::ApiResult,
    extractors::AdminSession,
    state::{ensure_loaded, AppState},
    views::{KycQuery, ListView},
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use ecofind_core::{User, types::UserId};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of approving a user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    /// Approved account
    pub id: UserId,
    /// Updated cached row, when the account was on the loaded list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// One page of the KYC listing
///
/// # Errors
///
/// Returns 400 for a bad query, or the backend error if the first load fails.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    Query(query): Query<KycQuery>,
) -> ApiResult<Json<ListView<User>>> {
    let loader = state.loader();
    ensure_loaded(
        &state.users,
        &loader,
        false,
        state.backend.list_users(session.token()),
    )
    .await?;

    let mut users = state.users.lock().await;
    query.apply(&mut users)?;
    Ok(Json(ListView::render(&mut users, "users")?))
}

/// Reload users from the backend, keeping the current filters
///
/// # Errors
///
/// Returns the backend error if the reload fails.
pub async fn refresh_users(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
) -> ApiResult<Json<ListView<User>>> {
    let loader = state.loader();
    ensure_loaded(
        &state.users,
        &loader,
        true,
        state.backend.list_users(session.token()),
    )
    .await?;

    let mut users = state.users.lock().await;
    Ok(Json(ListView::render(&mut users, "users")?))
}

/// Approve a user's documents and update the cached row
///
/// # Errors
///
/// Returns the backend error when the approval is refused; the cached row is
/// left untouched in that case.
pub async fn approve_user(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    Path(id): Path<UserId>,
) -> ApiResult<Json<ApprovalResponse>> {
    if let Err(err) = state.backend.approve_user(session.token(), &id).await {
        warn!(user = %id, error = %err, "Failed to approve user");
        return Err(err.into());
    }
    info!(user = %id, "User approved");

    let mut users = state.users.lock().await;
    let user = users
        .update(&id, User::mark_verified)
        .then(|| users.get(&id).cloned())
        .flatten();
    Ok(Json(ApprovalResponse { id, user }))
}
