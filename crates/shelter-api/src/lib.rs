//! # shelter-api
//!
//! HTTP API layer for Shelter built on Axum.
//!
//! Every request passes the bearer-token authenticator and then the route
//! policy before it reaches a handler. Handlers cover sign-in, token
//! refresh, the caller's own identity and credential updates.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
