//! Pending product moderation screen

use crate::{
    error::ApiResult,
    extractors::AdminSession,
    state::{ensure_loaded, AppState},
    views::{ListView, ProductQuery},
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use ecofind_core::{types::ProductId, Product};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Moderation decision on a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Listing goes live
    Approved,
    /// Listing is refused
    Rejected,
}

/// Result of a moderation action
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResponse {
    /// Moderated product
    pub id: ProductId,
    /// What happened to it
    pub decision: Decision,
    /// Whether a cached row was removed
    pub removed: bool,
}

/// One page of the pending-product listing
///
/// # Errors
///
/// Returns 400 for a bad query, or the backend error if the first load fails.
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<ListView<Product>>> {
    let loader = state.loader();
    ensure_loaded(
        &state.pending,
        &loader,
        false,
        state.backend.list_pending_products(session.token()),
    )
    .await?;

    let mut pending = state.pending.lock().await;
    query.apply(&mut pending)?;
    Ok(Json(ListView::render(&mut pending, "products")?))
}

/// Reload pending products from the backend
///
/// # Errors
///
/// Returns the backend error if the reload fails.
pub async fn refresh_pending(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
) -> ApiResult<Json<ListView<Product>>> {
    let loader = state.loader();
    ensure_loaded(
        &state.pending,
        &loader,
        true,
        state.backend.list_pending_products(session.token()),
    )
    .await?;

    let mut pending = state.pending.lock().await;
    Ok(Json(ListView::render(&mut pending, "products")?))
}

/// Approve a product and drop it from the pending list
///
/// # Errors
///
/// Returns the backend error when the approval is refused.
pub async fn approve_product(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    Path(id): Path<ProductId>,
) -> ApiResult<Json<ModerationResponse>> {
    moderate(&state, &session, id, Decision::Approved).await
}

/// Reject a product and drop it from the pending list
///
/// # Errors
///
/// Returns the backend error when the rejection is refused.
pub async fn reject_product(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
    Path(id): Path<ProductId>,
) -> ApiResult<Json<ModerationResponse>> {
    moderate(&state, &session, id, Decision::Rejected).await
}

async fn moderate(
    state: &AppState,
    session: &AdminSession,
    id: ProductId,
    decision: Decision,
) -> ApiResult<Json<ModerationResponse>> {
    let result = match decision {
        Decision::Approved => state.backend.approve_product(session.token(), id).await,
        Decision::Rejected => state.backend.reject_product(session.token(), id).await,
    };
    if let Err(err) = result {
        warn!(product = id, ?decision, error = %err, "Moderation action failed");
        return Err(err.into());
    }
    info!(product = id, ?decision, "Product moderated");

    let removed = state.pending.lock().await.remove(&id).is_some();
    Ok(Json(ModerationResponse {
        id,
        decision,
        removed,
    }))
}
