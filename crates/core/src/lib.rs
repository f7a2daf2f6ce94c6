//! Core of the APL speech issue demo skill.
//!
//! Maps request envelopes from the voice platform to canned spoken responses,
//! attaching an APL render directive when the device has a screen. Everything here is
//! synchronous and holds no state between requests.

pub mod apl;
pub mod capability;
pub mod diagnostics;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod response;

pub use dispatcher::{SkillBuilder, SkillDispatcher, apl_speech_issue_skill};
pub use envelope::RequestEnvelope;
pub use response::ResponseEnvelope;
