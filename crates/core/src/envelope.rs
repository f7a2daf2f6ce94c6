//! Request Envelope Model
//!
//! This module defines the inbound payload delivered by the voice platform for every
//! user interaction. Only the fields the skill reads are typed; everything else is kept
//! in flattened `extra` maps so the envelope can be re-serialised in full.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// The top-level payload sent by the platform to the skill endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    pub request: Request,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<bool>,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Context {
    #[serde(rename = "System")]
    pub system: SystemContext,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SystemContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_access_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The requesting device and the optional interfaces it declares.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Capability name to descriptor. A JSON `null` descriptor is kept as `None`.
    #[serde(default)]
    pub supported_interfaces: HashMap<String, Option<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The request body. `request_type` decides which of the other fields are meaningful.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// Why the session ended, only set on `SessionEndedRequest`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const ENVELOPE_VERSION: &str = "1.0";
pub const LAUNCH_REQUEST: &str = "LaunchRequest";
pub const INTENT_REQUEST: &str = "IntentRequest";
pub const SESSION_ENDED_REQUEST: &str = "SessionEndedRequest";

/// A tagged view over [`Request`] used by handler predicates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestKind<'a> {
    Launch,
    Intent(&'a Intent),
    SessionEnded { reason: Option<&'a str> },
    Other(&'a str),
}

impl Request {
    /// Creates a bare request of the given type, with every optional field unset.
    pub fn new(request_type: impl Into<String>) -> Self {
        Self {
            request_type: request_type.into(),
            request_id: None,
            timestamp: None,
            locale: None,
            intent: None,
            reason: None,
            error: None,
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> RequestKind<'_> {
        match self.request_type.as_str() {
            LAUNCH_REQUEST => RequestKind::Launch,
            INTENT_REQUEST => match &self.intent {
                Some(intent) => RequestKind::Intent(intent),
                None => RequestKind::Other(&self.request_type),
            },
            SESSION_ENDED_REQUEST => RequestKind::SessionEnded {
                reason: self.reason.as_deref(),
            },
            other => RequestKind::Other(other),
        }
    }
}

impl RequestEnvelope {
    /// Wraps a request with no session or context, as sent by simulators.
    pub fn new(request: Request) -> Self {
        Self {
            version: Some(ENVELOPE_VERSION.to_string()),
            session: None,
            context: None,
            request,
            extra: Map::new(),
        }
    }

    pub fn launch() -> Self {
        Self::new(Request::new(LAUNCH_REQUEST))
    }

    pub fn intent(name: impl Into<String>) -> Self {
        let mut request = Request::new(INTENT_REQUEST);
        request.intent = Some(Intent {
            name: name.into(),
            confirmation_status: None,
            slots: None,
            extra: Map::new(),
        });
        Self::new(request)
    }

    pub fn session_ended(reason: impl Into<String>) -> Self {
        let mut request = Request::new(SESSION_ENDED_REQUEST);
        request.reason = Some(reason.into());
        Self::new(request)
    }

    /// Declares a device capability on this envelope, creating the context on demand.
    pub fn with_supported_interface(mut self, name: impl Into<String>, descriptor: Option<Value>) -> Self {
        let context = self.context.get_or_insert_with(|| Context {
            system: SystemContext::default(),
            extra: Map::new(),
        });
        context
            .system
            .device
            .get_or_insert_with(Device::default)
            .supported_interfaces
            .insert(name.into(), descriptor);
        self
    }

    pub fn request_type(&self) -> &str {
        &self.request.request_type
    }

    /// The invoked intent's name; `None` unless this is an intent request.
    pub fn intent_name(&self) -> Option<&str> {
        match self.request.kind() {
            RequestKind::Intent(intent) => Some(intent.name.as_str()),
            _ => None,
        }
    }

    /// The capability declarations of the requesting device, if any were sent.
    pub fn supported_interfaces(&self) -> Option<&HashMap<String, Option<Value>>> {
        self.context
            .as_ref()
            .and_then(|c| c.system.device.as_ref())
            .map(|d| &d.supported_interfaces)
    }

    pub fn application_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|s| s.application.as_ref())
            .or_else(|| self.context.as_ref().and_then(|c| c.system.application.as_ref()))
            .map(|a| a.application_id.as_str())
    }

    pub fn session_attributes(&self) -> Option<&Map<String, Value>> {
        self.session.as_ref().and_then(|s| s.attributes.as_ref())
    }
}
