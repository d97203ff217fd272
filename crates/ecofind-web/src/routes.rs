//! Route definitions for the console API

use crate::{handlers, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the complete console router
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(console_routes())
        .merge(chat_routes())
}

/// Liveness routes (no session required)
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(handlers::health::health_check))
}

/// Login, logout and session lookup
pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/session", get(handlers::auth::current_session))
}

/// Admin screens (admin session required)
pub fn console_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/dashboard", get(handlers::dashboard::dashboard))
        // KYC review
        .route("/api/kyc/users", get(handlers::kyc::list_users))
        .route("/api/kyc/refresh", post(handlers::kyc::refresh_users))
        .route(
            "/api/kyc/users/:id/approve",
            post(handlers::kyc::approve_user),
        )
        // Product moderation
        .route("/api/products/pending", get(handlers::products::list_pending))
        .route(
            "/api/products/refresh",
            post(handlers::products::refresh_pending),
        )
        .route(
            "/api/products/:id/approve",
            post(handlers::products::approve_product),
        )
        .route(
            "/api/products/:id/reject",
            post(handlers::products::reject_product),
        )
}

/// Chat widget conversations and the lead sink they post to
pub fn chat_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/chatlead", post(handlers::chatlead::receive_lead))
        .route("/api/chat/sessions", post(handlers::chat::create_session))
        .route(
            "/api/chat/sessions/:id",
            get(handlers::chat::get_session).delete(handlers::chat::delete_session),
        )
        .route(
            "/api/chat/sessions/:id/option",
            post(handlers::chat::select_option),
        )
        .route(
            "/api/chat/sessions/:id/details",
            post(handlers::chat::submit_details),
        )
        .route(
            "/api/chat/sessions/:id/restart",
            post(handlers::chat::restart_session),
        )
}
