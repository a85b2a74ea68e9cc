//! Entries read back from a stream

use serde_json::Value;
use std::collections::HashMap;

use crate::envelope::fields;
use crate::error::StreamError;

/// One stream entry as delivered to a consumer
#[derive(Debug, Clone, PartialEq)]
pub struct StreamMessage {
    /// Entry ID (e.g. "1759528777065-0")
    pub id: String,
    pub fields: HashMap<String, String>,
}

impl StreamMessage {
    pub fn new(id: impl Into<String>, fields: HashMap<String, String>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Routing key set by the producer
    pub fn key(&self) -> Option<&str> {
        self.field(fields::KEY)
    }

    /// Decode the `body` field as JSON
    pub fn decode_json(&self) -> Result<Value, StreamError> {
        let body = self.field(fields::BODY).ok_or_else(|| StreamError::Malformed {
            id: self.id.clone(),
            reason: "missing body field".to_string(),
        })?;

        serde_json::from_str(body).map_err(|e| StreamError::Malformed {
            id: self.id.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(fields: &[(&str, &str)]) -> StreamMessage {
        StreamMessage::new(
            "1759528777065-0",
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_decode_json_body() {
        let msg = message(&[("body", r#"{"event_type":"lead.created"}"#), ("key", "abc")]);
        assert_eq!(msg.decode_json().unwrap(), json!({"event_type": "lead.created"}));
        assert_eq!(msg.key(), Some("abc"));
    }

    #[test]
    fn test_decode_json_missing_body() {
        let err = message(&[]).decode_json().unwrap_err();
        assert!(matches!(err, StreamError::Malformed { .. }));
    }

    #[test]
    fn test_decode_json_invalid_body() {
        let err = message(&[("body", "{not json")]).decode_json().unwrap_err();
        assert!(err.to_string().contains("1759528777065-0"));
    }
}
