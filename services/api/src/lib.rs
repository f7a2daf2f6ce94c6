//! APL Speech Issue Skill API Library Crate
//!
//! This library hosts the skill over HTTP: configuration, application state,
//! request handlers and routing. The `api` binary is a thin wrapper around it.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
