//! HTTP request handlers for the console API

pub mod auth;
pub mod chat;
pub mod chatlead;
pub mod dashboard;
pub mod health;
pub mod kyc;
pub mod products;
