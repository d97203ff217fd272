//! Local sink for leads collected by the chat widget

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use ecofind_core::{LeadSink, Lead};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

/// Answer of the chat-lead endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadAck {
    /// Whether the lead was recorded
    pub success: bool,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LeadAck {
    fn failed(status: StatusCode, error: impl Into<String>) -> Response {
        let body = Self {
            success: false,
            error: Some(error.into()),
        };
        (status, Json(body)).into_response()
    }
}

/// Record a lead posted by the chat widget
///
/// Malformed JSON answers 500 with a generic message; a lead with a blank
/// or oversized field answers 400.
pub async fn receive_lead(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let lead: Lead = match serde_json::from_slice(&body) {
        Ok(lead) => lead,
        Err(e) => {
            warn!(error = %e, "Malformed chat lead payload");
            return LeadAck::failed(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process chat lead",
            );
        }
    };

    if let Err(errors) = lead.validate() {
        warn!(%errors, "Chat lead failed validation");
        return LeadAck::failed(StatusCode::BAD_REQUEST, format!("Invalid lead: {errors}"));
    }

    info!(
        company = %lead.company_name,
        contact = %lead.user_name,
        phone = %lead.phone_number,
        "Chat lead received"
    );
    let outcome = state.leads.submit(&lead).await;
    if !outcome.is_accepted() {
        warn!(?outcome, "Chat lead was not recorded");
        return LeadAck::failed(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to process chat lead",
        );
    }

    Json(LeadAck {
        success: true,
        error: None,
    })
    .into_response()
}
