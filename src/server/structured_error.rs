use std::fmt::Display;

use serde::Serialize;

use crate::logging::get_log_file_path;
use crate::server::error_mapping::ToStructuredError;

#[derive(Serialize)]
pub struct ErrorMessage {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    pub code: String,
}

/// In-band error document returned in a response's `error` field.
#[derive(Serialize)]
pub struct StructuredError {
    /// Collection the request targeted, empty for cross-module calls.
    pub entity: String,
    pub logs: String,
    pub messages: Vec<ErrorMessage>,
}

impl StructuredError {
    #[must_use]
    pub fn new(entity: &str, code: &str, message: String) -> Self {
        Self {
            entity: entity.to_string(),
            logs: get_log_file_path().to_string(),
            messages: vec![ErrorMessage {
                message,
                tip: None,
                code: code.to_string(),
            }],
        }
    }

    #[must_use]
    pub fn with_tip(mut self, tip: &str) -> Self {
        if let Some(msg) = self.messages.first_mut() {
            msg.tip = Some(tip.to_string());
        }
        self
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"entity":"","logs":"","messages":[{"message":"serialization error","code":"INTERNAL_ERROR"}]}"#.to_string()
        })
    }
}

/// Render a domain error as the structured JSON error string.
#[must_use]
pub fn to_error_json<E: ToStructuredError + Display>(entity: &str, err: &E) -> String {
    let (code, tip) = err.error_code_and_tip();
    let mut se = StructuredError::new(entity, code, err.to_string());
    if let Some(tip) = tip {
        se = se.with_tip(tip);
    }
    se.to_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EntityType, RecordError};

    #[test]
    fn test_structured_error_json_format() {
        let err = RecordError::not_found(EntityType::Partner, "abc");
        let parsed: serde_json::Value =
            serde_json::from_str(&to_error_json("partners", &err)).unwrap();
        assert_eq!(parsed["entity"], "partners");
        assert_eq!(parsed["messages"][0]["code"], "RECORD_NOT_FOUND");
        assert_eq!(parsed["messages"][0]["message"], "partners record not found: abc");
        assert!(parsed.get("logs").is_some());
    }

    #[test]
    fn test_tip_present_only_when_mapped() {
        let conflict = RecordError::Conflict("Cannot edit a record that has pending changes".into());
        let json = to_error_json("memberships", &conflict);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["messages"][0]["code"], "CONFLICT");
        assert!(parsed["messages"][0]["tip"].is_string());

        let invalid = RecordError::validation("country is required");
        assert!(!to_error_json("partners", &invalid).contains("\"tip\""));
    }
}
