//! Response Envelope Model and Builder
//!
//! Defines what the skill sends back to the platform: speech, an optional reprompt,
//! rendering directives and the session flag. Handlers never assemble these structures
//! by hand; they go through [`ResponseBuilder`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const RESPONSE_VERSION: &str = "1.0";

/// The full payload returned to the platform for one request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub session_attributes: Map<String, Value>,
    pub user_agent: String,
    pub response: Response,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    /// Left unset unless a reprompt keeps the session open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    #[serde(rename = "SSML")]
    Ssml { ssml: String },
    #[serde(rename = "PlainText")]
    PlainText { text: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

/// A non-speech instruction for the device.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Directive {
    /// Renders an APL document. `token` correlates later updates with this render.
    #[serde(rename = "Alexa.Presentation.APL.RenderDocument")]
    RenderDocument {
        token: String,
        document: Value,
        datasources: Value,
    },
}

impl Directive {
    pub fn token(&self) -> &str {
        match self {
            Directive::RenderDocument { token, .. } => token,
        }
    }
}

impl OutputSpeech {
    /// Builds SSML speech, wrapping `text` in a single `<speak>` element.
    pub fn ssml(text: &str) -> Self {
        OutputSpeech::Ssml {
            ssml: format!("<speak>{}</speak>", trim_speak_tags(text)),
        }
    }

    /// The spoken markup without the outer `<speak>` element.
    pub fn text(&self) -> &str {
        match self {
            OutputSpeech::Ssml { ssml } => trim_speak_tags(ssml),
            OutputSpeech::PlainText { text } => text,
        }
    }
}

fn trim_speak_tags(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("<speak>")
        .and_then(|inner| inner.strip_suffix("</speak>"))
        .unwrap_or(trimmed)
}

impl Response {
    pub fn speech_text(&self) -> Option<&str> {
        self.output_speech.as_ref().map(OutputSpeech::text)
    }

    pub fn reprompt_text(&self) -> Option<&str> {
        self.reprompt.as_ref().map(|r| r.output_speech.text())
    }

    /// True when the response carries nothing for the device to do.
    pub fn is_empty(&self) -> bool {
        self.output_speech.is_none()
            && self.reprompt.is_none()
            && self.directives.is_empty()
            && self.should_end_session.is_none()
    }

    pub fn keeps_session_open(&self) -> bool {
        self.should_end_session == Some(false)
    }
}

/// Accumulates a [`Response`] one call at a time.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speak(mut self, text: &str) -> Self {
        self.response.output_speech = Some(OutputSpeech::ssml(text));
        self
    }

    /// Sets the reprompt. The session stays open waiting for the user's answer.
    pub fn reprompt(mut self, text: &str) -> Self {
        self.response.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::ssml(text),
        });
        self.response.should_end_session = Some(false);
        self
    }

    pub fn add_directive(mut self, directive: Directive) -> Self {
        self.response.directives.push(directive);
        self
    }

    pub fn get_response(self) -> Response {
        self.response
    }
}
