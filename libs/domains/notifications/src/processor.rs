//! Lead-created stream processor.
//!
//! Plugs the dispatch workflow into a [`stream_worker::StreamConsumer`].

use crate::providers::EmailProvider;
use crate::service::NotificationService;
use async_trait::async_trait;
use serde_json::{Map, Value};
use stream_worker::{StreamError, StreamMessage, StreamProcessor};
use tracing::{debug, info, warn};

pub const LEAD_CREATED: &str = "lead.created";

pub struct LeadCreatedProcessor<E: EmailProvider> {
    service: NotificationService<E>,
}

impl<E: EmailProvider> LeadCreatedProcessor<E> {
    pub fn new(service: NotificationService<E>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &NotificationService<E> {
        &self.service
    }
}

#[async_trait]
impl<E: EmailProvider> StreamProcessor for LeadCreatedProcessor<E> {
    async fn process(&self, message: &StreamMessage, payload: &Value) -> Result<(), StreamError> {
        let event_type = payload.get("event_type").and_then(Value::as_str).unwrap_or_default();
        if event_type != LEAD_CREATED {
            debug!(id = %message.id, event_type, "Skipping event");
            return Ok(());
        }

        let lead_data = match payload.get("lead_data") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(StreamError::Malformed {
                    id: message.id.clone(),
                    reason: "lead_data is not an object".to_string(),
                });
            }
        };

        info!(
            id = %message.id,
            lead_id = message.key().unwrap_or_default(),
            "Processing lead created event"
        );

        if !self.service.send_lead_email(&lead_data).await {
            warn!(id = %message.id, "Lead notifications not fully delivered");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LeadCreatedProcessor"
    }
}
