//! Axum Handlers for the Skill Endpoint
//!
//! The platform POSTs one request envelope per user interaction and expects the
//! response envelope back in the HTTP response body.

use apl_skill_core::{RequestEnvelope, ResponseEnvelope};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    models::{ErrorResponse, HealthResponse},
    state::AppState,
};

/// Failures that happen before a request reaches the skill.
///
/// Once an envelope is dispatched the skill always answers, so nothing after that
/// point maps to an HTTP error.
pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Rejected malformed request envelope");
        Self::BadRequest(rejection.body_text())
    }
}

/// Rejects envelopes addressed to a different skill when a skill id is configured.
fn verify_skill_id(state: &AppState, envelope: &RequestEnvelope) -> Result<(), ApiError> {
    let Some(expected) = state.config.skill_id.as_deref() else {
        return Ok(());
    };
    match envelope.application_id() {
        Some(actual) if actual == expected => Ok(()),
        actual => {
            warn!(expected, actual = ?actual, "Rejected request for another skill");
            Err(ApiError::BadRequest(
                "Request application id does not match this skill".to_string(),
            ))
        }
    }
}

/// Dispatch a request envelope to the skill.
pub async fn invoke_skill(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RequestEnvelope>, JsonRejection>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let Json(envelope) = payload?;
    verify_skill_id(&state, &envelope)?;
    info!(
        request_type = %envelope.request_type(),
        request_id = envelope.request.request_id.as_deref().unwrap_or_default(),
        "Skill request received"
    );

    let response = state.dispatcher.dispatch(&envelope);
    Ok(Json(response))
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
