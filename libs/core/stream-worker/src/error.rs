//! Stream error types

use thiserror::Error;

/// Errors raised by stream backends and processors.
///
/// The producer and consumer clients never surface these to their callers;
/// they are logged and turned into a `false` result or a dropped message.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Broker unavailable: {0}")]
    Unavailable(String),

    #[error("No such consumer group: {0}")]
    MissingGroup(String),

    #[error("Malformed message {id}: {reason}")]
    Malformed { id: String, reason: String },

    #[error("Processing error: {0}")]
    Processing(String),
}

impl StreamError {
    pub fn processing(message: impl Into<String>) -> Self {
        StreamError::Processing(message.into())
    }

    /// `XGROUP CREATE` on a group that already exists
    pub fn is_busy_group(&self) -> bool {
        matches!(self, StreamError::Redis(e) if e.code() == Some("BUSYGROUP"))
    }

    /// The group being read from no longer exists, e.g. after a broker restart
    pub fn is_no_group(&self) -> bool {
        match self {
            StreamError::MissingGroup(_) => true,
            StreamError::Redis(e) => e.code() == Some("NOGROUP"),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_group_is_no_group() {
        assert!(StreamError::MissingGroup("notification_service".into()).is_no_group());
        assert!(!StreamError::Unavailable("down".into()).is_no_group());
    }

    #[test]
    fn test_group_checks_ignore_message_text() {
        assert!(!StreamError::processing("NOGROUP no such key").is_no_group());
        assert!(!StreamError::processing("BUSYGROUP already exists").is_busy_group());
    }
}
