//! Chat widget conversations
//!
//! Each conversation is a [`DialogEngine`] behind its own mutex. The mutex is
//! released while a lead is being delivered, so input arriving during that
//! window sees the engine in its submitting state and is refused with 409.
//! Delivery runs on its own task and always records its outcome, even when the
//! request that started it goes away.

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use ecofind_core::dialog::{DialogEngine, DialogView, Transition};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info};
use uuid::Uuid;

/// A freshly started conversation
#[derive(Debug, Clone, Serialize)]
pub struct ChatCreated {
    /// Conversation id for follow-up calls
    pub id: Uuid,
    /// Opening view
    pub view: DialogView,
}

/// Option click
#[derive(Debug, Clone, Deserialize)]
pub struct OptionRequest {
    /// Value of the chosen option
    pub value: String,
}

/// Start a conversation
///
/// # Errors
///
/// Returns 500 if the dialog script is unusable, 503 when too many
/// conversations are open.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> ApiResult<(StatusCode, Json<ChatCreated>)> {
    let engine = DialogEngine::new(Arc::clone(&state.script))?;
    let view = engine.view();
    let id = state.open_chat(engine)?;
    debug!(chat = %id, "Chat session started");

    Ok((StatusCode::CREATED, Json(ChatCreated { id, view })))
}

/// Current view of a conversation
///
/// # Errors
///
/// Returns 404 for an unknown conversation.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DialogView>> {
    let chat = state.chat(id)?;
    let view = chat.lock().await.view();
    Ok(Json(view))
}

/// Handle an option click, delivering the lead when the click submits
///
/// # Errors
///
/// Returns 404 for an unknown conversation, 409 while a submission is in
/// flight or after the conversation ended, 422 for an invalid option.
pub async fn select_option(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<OptionRequest>,
) -> ApiResult<Json<DialogView>> {
    let chat = state.chat(id)?;

    let transition = chat.lock().await.select_option(&request.value)?;
    if let Transition::Submit(lead) = transition {
        info!(chat = %id, company = %lead.company_name, "Submitting chat lead");
        let sink = Arc::clone(&state.lead_sink);
        let engine = Arc::clone(&chat);
        let delivery = tokio::spawn(async move {
            let outcome = sink.submit(&lead).await;
            engine.lock().await.finish_submission(&outcome)
        });
        delivery.await.map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
                "INTERNAL_ERROR",
                format!("Lead delivery task failed: {e}"),
            )
        })??;
    }

    let view = chat.lock().await.view();
    Ok(Json(view))
}

/// Handle an input-step form submission
///
/// # Errors
///
/// Returns 404 for an unknown conversation, 409 while busy or ended, 422
/// when a required field is blank or the current step takes no input.
pub async fn submit_details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(values): Json<HashMap<String, String>>,
) -> ApiResult<Json<DialogView>> {
    let chat = state.chat(id)?;
    let mut engine = chat.lock().await;
    engine.submit_details(values)?;
    Ok(Json(engine.view()))
}

/// Start the conversation over
///
/// # Errors
///
/// Returns 404 for an unknown conversation, 409 while a submission is in
/// flight.
pub async fn restart_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DialogView>> {
    let chat = state.chat(id)?;
    let mut engine = chat.lock().await;
    engine.restart()?;
    Ok(Json(engine.view()))
}

/// Discard a conversation
///
/// # Errors
///
/// Returns 404 for an unknown conversation.
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .chats
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiError::not_found(format!("chat session {id}")))
}
