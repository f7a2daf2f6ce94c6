//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the skill dispatcher
//! and the configuration shared by every request handler.

use crate::config::Config;
use apl_skill_core::SkillDispatcher;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<SkillDispatcher>,
    pub config: Arc<Config>,
}
