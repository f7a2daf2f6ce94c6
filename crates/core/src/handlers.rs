//! Request Handlers
//!
//! Each handler owns one category of incoming request. The dispatcher asks every
//! handler, in registration order, whether it can handle the request and lets the
//! first one that says yes build the response.

use crate::{
    apl::AplDocument,
    capability::supports_apl,
    diagnostics::{DiagnosticRecord, DiagnosticSink},
    envelope::{RequestEnvelope, RequestKind},
    response::{Directive, Response, ResponseBuilder},
};
use anyhow::{Context, Result};
use serde_json::json;
use tracing::debug;

pub const CANCEL_INTENT: &str = "AMAZON.CancelIntent";
pub const STOP_INTENT: &str = "AMAZON.StopIntent";
pub const FALLBACK_INTENT: &str = "AMAZON.FallbackIntent";
pub const TEST_INTENT: &str = "TestIntent";

pub const WELCOME_SPEECH: &str =
    "Welcome to the APL Speech Issue demo. Please say, test, to start the demo";
pub const GOODBYE_SPEECH: &str = "Goodbye";
pub const FALLBACK_SPEECH: &str =
    "Sorry, didn't understand that. Say, test, to repeat the test output";

/// The quiz question whose speech goes missing when rendered together with APL.
pub const TEST_SPEECH: &str = concat!(
    r#"<break time="200ms"/> Question 4 of 5 <break time="500ms"/>"#,
    r#"<audio src="soundbank://soundlibrary/ui/gameshow/amzn_ui_sfx_gameshow_neutral_response_01"/>"#,
    r#"<break time="100ms"/>In the 2007 episode, Last of the Time Lords, what is the name of the flying metal spheres, which were actually cyborgs, unleashed by The Master?"#,
    r#"<break time="200ms"/><break time="300ms"/> 1: <break time="200ms"/>The Toclafane"#,
    r#"<break time="300ms"/> 2: <break time="200ms"/>The Loctafane"#,
    r#"<break time="300ms"/> 3: <break time="200ms"/>The Foclatane"#,
    r#"<audio src="https://s3.amazonaws.com/test.knownentity/AlexaSkills/DoctorWhoQuiz/audio/background_fusion_low.mp3"/>"#,
    r#"<break time="200ms"/> Here's the question again <break time="200ms"/> say Alexa <break time="100ms"/> followed by your answer number <break time="500ms"/>"#,
    r#" In the 2007 episode, Last of the Time Lords, what is the name of the flying metal spheres, which were actually cyborgs, unleashed by The Master?"#,
    r#"<break time="200ms"/><break time="300ms"/> 1: <break time="200ms"/>The Toclafane"#,
    r#"<break time="300ms"/> 2: <break time="200ms"/>The Loctafane"#,
    r#"<break time="300ms"/> 3: <break time="200ms"/>The Foclatane"#,
    r#"<audio src="https://s3.amazonaws.com/test.knownentity/AlexaSkills/DoctorWhoQuiz/audio/background_fusion_low.mp3"/>"#,
);

pub const TEST_DIRECTIVE_TOKEN: &str = "testToken";
pub const TEST_DOCUMENT_TEXT: &str =
    "This demo text would normally be a Dr Who Quiz question with 3-4 multiple choice answers.";

/// Everything a handler may look at while processing one request.
pub struct HandlerInput<'a> {
    pub request_envelope: &'a RequestEnvelope,
    pub diagnostics: &'a dyn DiagnosticSink,
}

impl<'a> HandlerInput<'a> {
    pub fn new(request_envelope: &'a RequestEnvelope, diagnostics: &'a dyn DiagnosticSink) -> Self {
        Self {
            request_envelope,
            diagnostics,
        }
    }

    /// A fresh builder; every response starts empty.
    pub fn response_builder(&self) -> ResponseBuilder {
        ResponseBuilder::new()
    }

    fn is_intent(&self, names: &[&str]) -> bool {
        self.request_envelope
            .intent_name()
            .is_some_and(|name| names.contains(&name))
    }
}

/// A predicate/responder pair for one category of request.
pub trait RequestHandler: Send + Sync {
    /// Identifies the handler in logs and error causes.
    fn name(&self) -> &'static str;

    fn can_handle(&self, input: &HandlerInput<'_>) -> Result<bool>;

    fn handle(&self, input: &HandlerInput<'_>) -> Result<Response>;
}

pub struct LaunchRequestHandler;

impl RequestHandler for LaunchRequestHandler {
    fn name(&self) -> &'static str {
        "LaunchRequestHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> Result<bool> {
        Ok(matches!(input.request_envelope.request.kind(), RequestKind::Launch))
    }

    fn handle(&self, input: &HandlerInput<'_>) -> Result<Response> {
        Ok(input
            .response_builder()
            .speak(WELCOME_SPEECH)
            .reprompt(WELCOME_SPEECH)
            .get_response())
    }
}

pub struct CancelAndStopIntentHandler;

impl RequestHandler for CancelAndStopIntentHandler {
    fn name(&self) -> &'static str {
        "CancelAndStopIntentHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> Result<bool> {
        Ok(input.is_intent(&[CANCEL_INTENT, STOP_INTENT]))
    }

    fn handle(&self, input: &HandlerInput<'_>) -> Result<Response> {
        Ok(input.response_builder().speak(GOODBYE_SPEECH).get_response())
    }
}

/// Speaks the quiz question and, on screen devices, renders the APL document with it.
pub struct TestIntentHandler {
    document: AplDocument,
}

impl TestIntentHandler {
    pub fn new(document: AplDocument) -> Self {
        Self { document }
    }

    fn render_directive(&self) -> Directive {
        Directive::RenderDocument {
            token: TEST_DIRECTIVE_TOKEN.to_string(),
            document: self.document.as_value().clone(),
            datasources: json!({
                "myDocumentData": {
                    "text": TEST_DOCUMENT_TEXT
                }
            }),
        }
    }
}

impl RequestHandler for TestIntentHandler {
    fn name(&self) -> &'static str {
        "TestIntentHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> Result<bool> {
        Ok(input.is_intent(&[TEST_INTENT]))
    }

    fn handle(&self, input: &HandlerInput<'_>) -> Result<Response> {
        let mut builder = input.response_builder();
        if supports_apl(input.request_envelope) {
            debug!("Device supports APL, adding render directive");
            builder = builder.add_directive(self.render_directive());
        }
        Ok(builder.speak(TEST_SPEECH).reprompt(TEST_SPEECH).get_response())
    }
}

pub struct FallbackIntentHandler;

impl RequestHandler for FallbackIntentHandler {
    fn name(&self) -> &'static str {
        "FallbackIntentHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> Result<bool> {
        Ok(input.is_intent(&[FALLBACK_INTENT]))
    }

    fn handle(&self, input: &HandlerInput<'_>) -> Result<Response> {
        Ok(input
            .response_builder()
            .speak(FALLBACK_SPEECH)
            .reprompt(FALLBACK_SPEECH)
            .get_response())
    }
}

/// Records the closing envelope and answers with an empty response.
pub struct SessionEndedRequestHandler;

impl RequestHandler for SessionEndedRequestHandler {
    fn name(&self) -> &'static str {
        "SessionEndedRequestHandler"
    }

    fn can_handle(&self, input: &HandlerInput<'_>) -> Result<bool> {
        Ok(matches!(
            input.request_envelope.request.kind(),
            RequestKind::SessionEnded { .. }
        ))
    }

    fn handle(&self, input: &HandlerInput<'_>) -> Result<Response> {
        if let RequestKind::SessionEnded { reason } = input.request_envelope.request.kind() {
            debug!(reason = reason.unwrap_or_default(), "Session ended");
        }
        let envelope = serde_json::to_string(input.request_envelope)
            .context("Failed to serialize the session ended envelope")?;
        input
            .diagnostics
            .record(DiagnosticRecord::SessionEnded { envelope });
        Ok(input.response_builder().get_response())
    }
}

/// The skill's handlers, in the order they must be consulted.
pub fn standard_handlers(document: AplDocument) -> Vec<Box<dyn RequestHandler>> {
    vec![
        Box::new(LaunchRequestHandler),
        Box::new(CancelAndStopIntentHandler),
        Box::new(TestIntentHandler::new(document)),
        Box::new(FallbackIntentHandler),
        Box::new(SessionEndedRequestHandler),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        capability::APL_INTERFACE,
        diagnostics::{MockDiagnosticSink, TracingSink},
    };

    fn document() -> AplDocument {
        AplDocument::embedded().unwrap()
    }

    #[test]
    fn test_launch_handler() {
        let envelope = RequestEnvelope::launch();
        let input = HandlerInput::new(&envelope, &TracingSink);

        assert!(LaunchRequestHandler.can_handle(&input).unwrap());
        let response = LaunchRequestHandler.handle(&input).unwrap();
        assert_eq!(response.speech_text(), Some(WELCOME_SPEECH));
        assert_eq!(response.reprompt_text(), Some(WELCOME_SPEECH));
        assert!(response.keeps_session_open());
        assert!(response.directives.is_empty());
    }

    #[test]
    fn test_cancel_and_stop_handler() {
        for intent in [CANCEL_INTENT, STOP_INTENT] {
            let envelope = RequestEnvelope::intent(intent);
            let input = HandlerInput::new(&envelope, &TracingSink);

            assert!(CancelAndStopIntentHandler.can_handle(&input).unwrap());
            let response = CancelAndStopIntentHandler.handle(&input).unwrap();
            assert_eq!(response.speech_text(), Some(GOODBYE_SPEECH));
            assert_eq!(response.reprompt, None);
            assert!(!response.keeps_session_open());
        }
    }

    #[test]
    fn test_predicates_are_exclusive() {
        let handlers = standard_handlers(document());
        let envelopes = [
            RequestEnvelope::launch(),
            RequestEnvelope::intent(CANCEL_INTENT),
            RequestEnvelope::intent(STOP_INTENT),
            RequestEnvelope::intent(TEST_INTENT),
            RequestEnvelope::intent(FALLBACK_INTENT),
            RequestEnvelope::session_ended("USER_INITIATED"),
        ];

        for envelope in &envelopes {
            let input = HandlerInput::new(envelope, &TracingSink);
            let matching = handlers
                .iter()
                .filter(|h| h.can_handle(&input).unwrap())
                .count();
            assert_eq!(matching, 1, "request {:?}", envelope.request.kind());
        }

        let unknown = RequestEnvelope::intent("Unknown.Intent");
        let input = HandlerInput::new(&unknown, &TracingSink);
        assert!(handlers.iter().all(|h| !h.can_handle(&input).unwrap()));
    }

    #[test]
    fn test_test_intent_with_apl() {
        let handler = TestIntentHandler::new(document());
        let envelope = RequestEnvelope::intent(TEST_INTENT)
            .with_supported_interface(APL_INTERFACE, Some(serde_json::json!({})));
        let input = HandlerInput::new(&envelope, &TracingSink);

        let response = handler.handle(&input).unwrap();
        assert_eq!(response.speech_text(), Some(TEST_SPEECH));
        assert_eq!(response.reprompt_text(), Some(TEST_SPEECH));
        assert_eq!(response.directives.len(), 1);

        let Directive::RenderDocument {
            token,
            document: rendered,
            datasources,
        } = &response.directives[0];
        assert_eq!(token, TEST_DIRECTIVE_TOKEN);
        assert_eq!(rendered, document().as_value());
        assert_eq!(datasources["myDocumentData"]["text"], TEST_DOCUMENT_TEXT);
    }

    #[test]
    fn test_test_intent_without_apl() {
        let handler = TestIntentHandler::new(document());
        let envelope = RequestEnvelope::intent(TEST_INTENT);
        let input = HandlerInput::new(&envelope, &TracingSink);

        let response = handler.handle(&input).unwrap();
        assert_eq!(response.speech_text(), Some(TEST_SPEECH));
        assert!(response.directives.is_empty());
    }

    #[test]
    fn test_test_speech_interleaves_breaks_and_audio() {
        assert!(TEST_SPEECH.starts_with(r#"<break time="200ms"/> Question 4 of 5"#));
        assert_eq!(TEST_SPEECH.matches("<audio src=").count(), 3);
        assert!(TEST_SPEECH.contains("Here's the question again"));
        assert!(TEST_SPEECH.ends_with("background_fusion_low.mp3\"/>"));
    }

    #[test]
    fn test_fallback_handler() {
        let envelope = RequestEnvelope::intent(FALLBACK_INTENT);
        let input = HandlerInput::new(&envelope, &TracingSink);

        let response = FallbackIntentHandler.handle(&input).unwrap();
        assert_eq!(response.speech_text(), response.reprompt_text());
        assert_eq!(response.speech_text(), Some(FALLBACK_SPEECH));
    }

    #[test]
    fn test_session_ended_records_full_envelope() {
        let envelope = RequestEnvelope::session_ended("EXCEEDED_MAX_REPROMPTS");
        let expected = serde_json::to_string(&envelope).unwrap();

        let mut sink = MockDiagnosticSink::new();
        sink.expect_record()
            .withf(move |record| {
                *record
                    == DiagnosticRecord::SessionEnded {
                        envelope: expected.clone(),
                    }
            })
            .times(1)
            .return_const(());

        let input = HandlerInput::new(&envelope, &sink);
        let response = SessionEndedRequestHandler.handle(&input).unwrap();

        assert!(response.is_empty());
        assert_eq!(serde_json::to_string(&response).unwrap(), "{}");
    }

    #[test]
    fn test_session_ended_record_matches_received_envelope() {
        let received = serde_json::json!({
            "session": { "new": false, "sessionId": "s", "affiliatedResources": [] },
            "context": {
                "System": {
                    "unit": { "unitId": "u" },
                    "person": { "personId": "p" },
                    "device": {
                        "deviceId": "d",
                        "persistentEndpointId": "e",
                        "supportedInterfaces": {}
                    }
                }
            },
            "request": { "type": "SessionEndedRequest", "reason": "USER_INITIATED" },
            "topLevelExtra": 1
        });
        let envelope: RequestEnvelope = serde_json::from_value(received.clone()).unwrap();
        let sink = crate::diagnostics::MemorySink::new();

        let input = HandlerInput::new(&envelope, &sink);
        SessionEndedRequestHandler.handle(&input).unwrap();

        let records = sink.records();
        let [DiagnosticRecord::SessionEnded { envelope: logged }] = records.as_slice() else {
            panic!("Expected one SessionEnded record, got {:?}", records);
        };
        let logged: serde_json::Value = serde_json::from_str(logged).unwrap();
        assert_eq!(logged, received);
    }
}
