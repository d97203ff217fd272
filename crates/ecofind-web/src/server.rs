//! Web server setup and configuration

use crate::{routes::build_routes, state::AppState};
use axum::Router;
use ecofind_core::{Config, Result};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

/// Build the complete console application with all routes and state
///
/// # Errors
///
/// Returns an error if the application state cannot be built.
pub fn build_app(config: Config) -> Result<Router> {
    Ok(build_app_with_state(Arc::new(AppState::new(config)?)))
}

/// Build the console application around an existing state
pub fn build_app_with_state(state: Arc<AppState>) -> Router {
    build_routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Periodically expire idle chat conversations
///
/// Runs every half idle timeout, at most once a minute, until aborted.
pub fn spawn_chat_sweeper(state: Arc<AppState>) -> JoinHandle<()> {
    let period = Duration::from_secs((state.config.chat.idle_timeout / 2).clamp(1, 60));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            state.sweep_idle_chats();
        }
    })
}
