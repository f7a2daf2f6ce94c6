//! Skill Dispatcher
//!
//! Routes each request envelope to the first handler willing to take it. Whatever
//! happens inside the handlers, exactly one response envelope comes out: a handler
//! that fails, or a request nobody claims, is answered by the [`ErrorResponder`].

use crate::{
    apl::AplDocument,
    diagnostics::{DiagnosticSink, TracingSink},
    envelope::RequestEnvelope,
    error::{DispatchError, ErrorResponder},
    handlers::{HandlerInput, RequestHandler, standard_handlers},
    response::{RESPONSE_VERSION, Response, ResponseEnvelope},
};
use std::sync::Arc;
use tracing::{debug, info_span};

/// User agent suffix of the demo skill.
pub const SKILL_USER_AGENT: &str = "sample/apl_speech_issue/v1.0";

const BASE_USER_AGENT: &str = concat!("apl-skill-core/", env!("CARGO_PKG_VERSION"));

/// Assembles a [`SkillDispatcher`].
pub struct SkillBuilder {
    handlers: Vec<Box<dyn RequestHandler>>,
    error_responder: ErrorResponder,
    diagnostics: Arc<dyn DiagnosticSink>,
    custom_user_agent: Option<String>,
}

impl Default for SkillBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillBuilder {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            error_responder: ErrorResponder,
            diagnostics: Arc::new(TracingSink),
            custom_user_agent: None,
        }
    }

    /// Appends a handler. Handlers are consulted in the order they were added.
    pub fn add_request_handler(mut self, handler: impl RequestHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn add_request_handlers(
        mut self,
        handlers: impl IntoIterator<Item = Box<dyn RequestHandler>>,
    ) -> Self {
        self.handlers.extend(handlers);
        self
    }

    pub fn with_custom_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.custom_user_agent = Some(user_agent.into());
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn build(self) -> SkillDispatcher {
        let user_agent = match self.custom_user_agent {
            Some(custom) => format!("{} {}", BASE_USER_AGENT, custom),
            None => BASE_USER_AGENT.to_string(),
        };
        SkillDispatcher {
            handlers: self.handlers,
            error_responder: self.error_responder,
            diagnostics: self.diagnostics,
            user_agent,
        }
    }
}

/// A stateless router from request envelopes to response envelopes.
pub struct SkillDispatcher {
    handlers: Vec<Box<dyn RequestHandler>>,
    error_responder: ErrorResponder,
    diagnostics: Arc<dyn DiagnosticSink>,
    user_agent: String,
}

impl SkillDispatcher {
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Produces the response envelope for one request.
    pub fn dispatch(&self, envelope: &RequestEnvelope) -> ResponseEnvelope {
        let span = info_span!(
            "dispatch",
            request_type = %envelope.request_type(),
            intent = envelope.intent_name().unwrap_or_default(),
            handler = tracing::field::Empty,
        );
        let _guard = span.enter();

        let input = HandlerInput::new(envelope, self.diagnostics.as_ref());
        let response = match self.route(&input) {
            Ok((handler, response)) => {
                span.record("handler", handler);
                debug!("Request handled");
                response
            }
            Err(error) => self.error_responder.respond(&input, &error),
        };

        ResponseEnvelope {
            version: RESPONSE_VERSION.to_string(),
            session_attributes: envelope.session_attributes().cloned().unwrap_or_default(),
            user_agent: self.user_agent.clone(),
            response,
        }
    }

    fn route(&self, input: &HandlerInput<'_>) -> Result<(&'static str, Response), DispatchError> {
        for handler in &self.handlers {
            let name = handler.name();
            let claimed = handler
                .can_handle(input)
                .map_err(|source| DispatchError::HandlerFailed { handler: name, source })?;
            if claimed {
                let response = handler
                    .handle(input)
                    .map_err(|source| DispatchError::HandlerFailed { handler: name, source })?;
                return Ok((name, response));
            }
        }

        Err(DispatchError::NoMatchingHandler {
            request_type: input.request_envelope.request_type().to_string(),
            intent_name: input.request_envelope.intent_name().map(str::to_string),
        })
    }
}

/// Builds the APL speech issue demo skill with its handlers in their fixed order.
pub fn apl_speech_issue_skill(
    document: AplDocument,
    diagnostics: Arc<dyn DiagnosticSink>,
) -> SkillDispatcher {
    SkillBuilder::new()
        .add_request_handlers(standard_handlers(document))
        .with_custom_user_agent(SKILL_USER_AGENT)
        .with_diagnostics(diagnostics)
        .build()
}
