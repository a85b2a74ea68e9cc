//! Lead-created domain event

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use stream_worker::{Envelope, StreamError, headers, to_json_map};
use uuid::Uuid;

use crate::models::LeadResponse;

pub const LEAD_CREATED: &str = "lead.created";
pub const EVENT_SOURCE: &str = "lead_service";
pub const EVENT_VERSION: &str = "1.0";

/// Emitted once per successfully persisted lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadCreatedEvent {
    pub event_type: String,
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub lead_id: Uuid,
    /// JSON-safe snapshot of the lead view
    pub lead_data: Map<String, Value>,
    pub metadata: Map<String, Value>,
}

/// `{source: "lead_service", event_version: "1.0"}`
pub fn default_metadata() -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert("source".into(), json!(EVENT_SOURCE));
    metadata.insert("event_version".into(), json!(EVENT_VERSION));
    metadata
}

impl LeadCreatedEvent {
    pub fn from_lead(lead: &LeadResponse, metadata: Map<String, Value>) -> Result<Self, StreamError> {
        Ok(Self {
            event_type: LEAD_CREATED.to_string(),
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            lead_id: lead.id,
            lead_data: to_json_map(lead)?,
            metadata,
        })
    }

    /// Envelope keyed by lead id so events for one lead share a route
    pub fn to_envelope(&self, topic: &str) -> Result<Envelope, StreamError> {
        Ok(Envelope::new(topic, to_json_map(self)?)
            .with_key(self.lead_id.to_string())
            .with_header(headers::EVENT_TYPE, &self.event_type)
            .with_header(headers::EVENT_ID, &self.event_id))
    }
}
