//! HTTP Payload Models
//!
//! The skill endpoint itself speaks the platform's envelope types from
//! `apl_skill_core`; this module only holds the service's own payloads.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            message: "Skill id mismatch".to_string(),
        };

        let json = serde_json::to_string(&error).unwrap();
        let expected = r#"{"message":"Skill id mismatch"}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_health_response() {
        let health = HealthResponse::ok();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));

        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
