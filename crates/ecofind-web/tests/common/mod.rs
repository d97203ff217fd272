//! Common test utilities and fixtures for integration tests
#![allow(dead_code, unreachable_pub, clippy::missing_panics_doc, clippy::unwrap_used)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
