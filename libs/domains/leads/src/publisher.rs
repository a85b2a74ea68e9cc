//! Best-effort publishing of lead events

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use stream_worker::{StreamBackend, StreamProducer};
use tracing::{error, info};

use crate::events::LeadCreatedEvent;
use crate::models::LeadResponse;

/// Hands lead events to the broker. Never fails the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadEventPublisher: Send + Sync {
    /// Whether the broker acknowledged the event
    async fn publish_lead_created(&self, lead: &LeadResponse, metadata: Map<String, Value>) -> bool;

    /// Whether the broker connection is usable
    async fn health_check(&self) -> bool;
}

/// [`LeadEventPublisher`] over a [`StreamProducer`]
pub struct EventPublisher<B: StreamBackend> {
    producer: Arc<StreamProducer<B>>,
    topic: String,
}

impl<B: StreamBackend> EventPublisher<B> {
    pub fn new(producer: Arc<StreamProducer<B>>, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl<B: StreamBackend> LeadEventPublisher for EventPublisher<B> {
    async fn publish_lead_created(&self, lead: &LeadResponse, metadata: Map<String, Value>) -> bool {
        let built = LeadCreatedEvent::from_lead(lead, metadata)
            .and_then(|event| Ok((event.to_envelope(&self.topic)?, event.event_id)));
        let (envelope, event_id) = match built {
            Ok(built) => built,
            Err(e) => {
                error!(lead_id = %lead.id, error = %e, "Failed to build lead created event");
                return false;
            }
        };

        let delivered = self.producer.send(&envelope).await;
        if delivered {
            info!(event_id = %event_id, lead_id = %lead.id, topic = %self.topic, "Lead created event published");
        } else {
            error!(event_id = %event_id, lead_id = %lead.id, topic = %self.topic, "Failed to publish lead created event");
        }
        delivered
    }

    async fn health_check(&self) -> bool {
        self.producer.health_check().await
    }
}
