//! Error Responder
//!
//! The fallback for requests no handler claims or a handler fails on. The cause is
//! recorded for diagnosis; the user only ever hears the same apology.

use crate::{
    diagnostics::DiagnosticRecord,
    handlers::HandlerInput,
    response::Response,
};

pub const ERROR_SPEECH: &str = "Oops, something went wrong.";

/// Why a request ended up with the error responder. Never shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Unable to find a suitable request handler for request type '{request_type}'{}", intent_suffix(.intent_name))]
    NoMatchingHandler {
        request_type: String,
        intent_name: Option<String>,
    },
    #[error("Handler '{handler}' failed: {source:#}")]
    HandlerFailed {
        handler: &'static str,
        source: anyhow::Error,
    },
}

fn intent_suffix(intent_name: &Option<String>) -> String {
    intent_name
        .as_ref()
        .map(|name| format!(" (intent '{}')", name))
        .unwrap_or_default()
}

/// The terminal fallback of the dispatcher: apologises and records the cause.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorResponder;

impl ErrorResponder {
    pub fn respond(&self, input: &HandlerInput<'_>, error: &DispatchError) -> Response {
        input.diagnostics.record(DiagnosticRecord::ErrorHandled {
            cause: error.to_string(),
        });
        input.response_builder().speak(ERROR_SPEECH).get_response()
    }
}
