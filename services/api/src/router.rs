//! Axum Router Configuration
//!
//! This module defines the HTTP routing for the skill endpoint and the health probe.

use crate::{handlers, state::AppState};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::invoke_skill))
        .route("/skill", post(handlers::invoke_skill))
        .route("/health", get(handlers::health))
        .with_state(app_state)
}
