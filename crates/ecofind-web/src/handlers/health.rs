//! Liveness endpoint

use crate::state::AppState;
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `OK` while the process serves requests
    pub status: String,
    /// Service version
    pub version: String,
    /// Timestamp of the check
    pub timestamp: DateTime<Utc>,
    /// Seconds since start-up
    pub uptime_seconds: u64,
    /// Whether an admin session is live
    pub logged_in: bool,
}

/// Report that the console is up
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        logged_in: state.current_session().is_some(),
    })
}
