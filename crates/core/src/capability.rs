//! Capability Detection
//!
//! Devices list the optional interfaces they support in the request context. The demo
//! intent only renders its APL document when the screen interface is declared.

use crate::envelope::RequestEnvelope;

/// Interface key a device declares when it can render APL documents.
pub const APL_INTERFACE: &str = "Alexa.Presentation.APL";

/// Checks whether the requesting device declares `interface` with a non-null descriptor.
pub fn supports_interface(envelope: &RequestEnvelope, interface: &str) -> bool {
    envelope
        .supported_interfaces()
        .and_then(|interfaces| interfaces.get(interface))
        .is_some_and(|descriptor| descriptor.as_ref().is_some_and(|d| !d.is_null()))
}

pub fn supports_apl(envelope: &RequestEnvelope) -> bool {
    supports_interface(envelope, APL_INTERFACE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_declared_interface_is_supported() {
        let envelope = RequestEnvelope::intent("TestIntent")
            .with_supported_interface(APL_INTERFACE, Some(json!({})));
        assert!(supports_apl(&envelope));
    }

    #[test]
    fn test_null_descriptor_is_not_supported() {
        let envelope = RequestEnvelope::intent("TestIntent")
            .with_supported_interface(APL_INTERFACE, None);
        assert!(!supports_apl(&envelope));

        let envelope = RequestEnvelope::intent("TestIntent")
            .with_supported_interface(APL_INTERFACE, Some(serde_json::Value::Null));
        assert!(!supports_apl(&envelope));
    }

    #[test]
    fn test_absent_key_or_context() {
        let envelope = RequestEnvelope::intent("TestIntent")
            .with_supported_interface("AudioPlayer", Some(json!({})));
        assert!(!supports_apl(&envelope));
        assert!(supports_interface(&envelope, "AudioPlayer"));

        assert!(!supports_apl(&RequestEnvelope::launch()));
    }
}
