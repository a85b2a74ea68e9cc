//! Broker transport seam

use async_trait::async_trait;
use std::time::Duration;

use crate::envelope::Envelope;
use crate::error::StreamError;
use crate::message::StreamMessage;

/// Opens sessions against an event broker.
#[async_trait]
pub trait StreamBackend: Send + Sync + 'static {
    type Session: StreamSession;

    /// Open and verify a session. Fails if the broker is unreachable.
    async fn open(&self) -> Result<Self::Session, StreamError>;

    fn name(&self) -> &'static str;
}

/// A live, cheaply cloneable connection to the broker.
#[async_trait]
pub trait StreamSession: Clone + Send + Sync + 'static {
    /// Append an envelope to its topic and return the broker-assigned entry ID
    /// once the broker has acknowledged the write.
    async fn append(&self, envelope: &Envelope, max_length: usize) -> Result<String, StreamError>;

    /// Create `group` on `stream` positioned at the latest entry.
    /// Succeeds when the group already exists.
    async fn create_group(&self, stream: &str, group: &str) -> Result<(), StreamError>;

    /// Read up to `count` new entries for `consumer`, waiting at most `block`.
    /// Returns an empty batch when nothing arrived in time.
    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
        block: Duration,
    ) -> Result<Vec<StreamMessage>, StreamError>;

    async fn ack(&self, stream: &str, group: &str, id: &str) -> Result<(), StreamError>;

    /// Round-trip to the broker
    async fn ping(&self) -> Result<(), StreamError>;

    /// Release the session. Further calls on clones may fail.
    async fn close(&self) {}
}
