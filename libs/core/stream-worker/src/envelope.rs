//! Event envelope codec
//!
//! An [`Envelope`] is what a producer hands to the broker: the target topic,
//! an optional routing key, a JSON object payload, string headers and the
//! emission timestamp. On Redis it is flattened into stream entry fields:
//!
//! | field          | value                               |
//! |----------------|-------------------------------------|
//! | `key`          | routing key (omitted when absent)   |
//! | `body`         | payload serialized as JSON          |
//! | `timestamp`    | RFC 3339 emission time              |
//! | *header name*  | header value, one field per header  |

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::StreamError;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Entry field names reserved by the envelope layout
pub mod fields {
    pub const KEY: &str = "key";
    pub const BODY: &str = "body";
    pub const TIMESTAMP: &str = "timestamp";
}

/// Well-known header names
pub mod headers {
    pub const EVENT_TYPE: &str = "event_type";
    pub const EVENT_ID: &str = "event_id";
    pub const CONTENT_TYPE: &str = "content_type";
}

/// Transport wrapper around a JSON payload
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub topic: String,
    pub key: Option<String>,
    pub payload: Map<String, Value>,
    pub headers: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    /// New envelope with `content_type: application/json` already set
    pub fn new(topic: impl Into<String>, payload: Map<String, Value>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(headers::CONTENT_TYPE.to_string(), CONTENT_TYPE_JSON.to_string());

        Self {
            topic: topic.into(),
            key: None,
            payload,
            headers,
            timestamp: Utc::now(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Payload serialized as a JSON object string
    pub fn body(&self) -> Result<String, StreamError> {
        Ok(serde_json::to_string(&self.payload)?)
    }

    /// Flatten into stream entry field/value pairs.
    ///
    /// Headers that collide with a reserved field name are skipped.
    pub fn to_fields(&self) -> Result<Vec<(String, String)>, StreamError> {
        let mut out = Vec::with_capacity(self.headers.len() + 3);

        if let Some(key) = &self.key {
            out.push((fields::KEY.to_string(), key.clone()));
        }
        out.push((fields::BODY.to_string(), self.body()?));
        out.push((
            fields::TIMESTAMP.to_string(),
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        ));

        for (name, value) in &self.headers {
            if matches!(name.as_str(), fields::KEY | fields::BODY | fields::TIMESTAMP) {
                continue;
            }
            out.push((name.clone(), value.clone()));
        }

        Ok(out)
    }
}

/// Convert any serializable value into a JSON-safe object map.
///
/// Timestamps and identifiers come out as strings through their `Serialize`
/// impls; values that do not serialize to a JSON object are rejected.
pub fn to_json_map<T: Serialize>(value: &T) -> Result<Map<String, Value>, StreamError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StreamError::Serialization(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
