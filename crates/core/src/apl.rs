//! The APL document rendered alongside the demo question.
//!
//! The document is an opaque blob to the skill: it is parsed only to check that it is
//! valid JSON and is otherwise forwarded untouched inside the render directive.

use serde_json::Value;
use std::path::Path;

const EMBEDDED_DOCUMENT: &str = include_str!("../assets/test.json");

#[derive(Debug, thiserror::Error)]
pub enum AplDocumentError {
    #[error("Failed to read APL document from {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("APL document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("APL document must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AplDocument(Value);

impl AplDocument {
    /// Parses a document from its JSON text.
    pub fn parse(json: &str) -> Result<Self, AplDocumentError> {
        let value: Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(AplDocumentError::NotAnObject);
        }
        Ok(Self(value))
    }

    /// The document shipped with the skill.
    pub fn embedded() -> Result<Self, AplDocumentError> {
        Self::parse(EMBEDDED_DOCUMENT)
    }

    pub fn from_path(path: &Path) -> Result<Self, AplDocumentError> {
        let json = std::fs::read_to_string(path).map_err(|source| AplDocumentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&json)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}
