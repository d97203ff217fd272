//! Dashboard summary

use crate::{
    error::{ApiError, ApiResult},
    extractors::AdminSession,
    state::AppState,
};
use axum::{extract::State, response::Json};
use ecofind_core::stats::Dashboard;
use std::sync::Arc;
use tracing::debug;

/// Counters, activity feed and newest products
///
/// Users and products are fetched concurrently; the dashboard keeps no cache.
///
/// # Errors
///
/// Returns the backend error if either fetch fails, 401 if the session ends
/// while the fetch is in flight.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    session: AdminSession,
) -> ApiResult<Json<Dashboard>> {
    let fetch = async {
        tokio::try_join!(
            state.backend.list_users(session.token()),
            state.backend.list_products(session.token()),
        )
    };
    let (users, products) = state
        .loader()
        .run(fetch)
        .await
        .loaded()
        .ok_or_else(ApiError::unauthorized)??;
    debug!(users = users.len(), products = products.len(), "Dashboard data fetched");

    Ok(Json(Dashboard::build(
        &users,
        &products,
        state.config.console.recent_products,
    )))
}
