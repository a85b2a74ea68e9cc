//! Per-message handling hook for [`StreamConsumer`](crate::StreamConsumer)

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StreamError;
use crate::message::StreamMessage;

/// Handles one decoded stream entry.
///
/// Errors are logged by the consumer and the entry is dropped; they never
/// stop the receive loop.
#[async_trait]
pub trait StreamProcessor: Send + Sync + 'static {
    async fn process(&self, message: &StreamMessage, payload: &Value) -> Result<(), StreamError>;

    /// Name used in log lines
    fn name(&self) -> &'static str;
}
