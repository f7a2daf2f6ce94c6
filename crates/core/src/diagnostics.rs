//! Diagnostic Sink
//!
//! The skill reports two kinds of diagnostic records: the full request envelope when a
//! session ends, and the cause whenever the error responder takes over. Records go to
//! a sink injected into the dispatcher rather than straight to a global logger, so
//! tests can observe them.

use std::sync::Mutex;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticRecord {
    /// The serialized request envelope of a `SessionEndedRequest`.
    SessionEnded { envelope: String },
    /// The cause that sent a request to the error responder.
    ErrorHandled { cause: String },
}

/// Receives diagnostic records produced while dispatching requests.
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, record: DiagnosticRecord);
}

/// Forwards records to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, record: DiagnosticRecord) {
        match record {
            DiagnosticRecord::SessionEnded { envelope } => {
                info!(%envelope, "~~~~ Session ended");
            }
            DiagnosticRecord::ErrorHandled { cause } => {
                error!(%cause, "~~~~ Error handled");
            }
        }
    }
}

/// Keeps every record in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the records collected so far.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, record: DiagnosticRecord) {
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}
