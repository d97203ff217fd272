//! `EcoFind` admin console server
//!
//! Serves the console JSON API over the marketplace backend: admin login, the
//! dashboard, the KYC and product moderation lists, and the chat widget with
//! its lead sink.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod api_client;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod lead_sink;
pub mod routes;
pub mod server;
pub mod state;
pub mod views;

// Re-export the main entry points
pub use server::{build_app, build_app_with_state, spawn_chat_sweeper};
pub use state::AppState;
