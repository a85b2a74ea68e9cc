//! Client configuration

use std::time::Duration;
use uuid::Uuid;

/// Settings for [`StreamProducer`](crate::StreamProducer)
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Approximate stream length cap (`MAXLEN ~`)
    pub max_length: usize,

    /// Upper bound on opening a broker session
    pub connect_timeout: Duration,

    /// Upper bound on a single send, including the broker acknowledgment
    pub send_timeout: Duration,
}

impl ProducerConfig {
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            max_length: 100_000,
            connect_timeout: Duration::from_secs(5),
            send_timeout: Duration::from_secs(5),
        }
    }
}

/// Settings for [`StreamConsumer`](crate::StreamConsumer)
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Stream (topic) to subscribe to
    pub stream: String,

    /// Consumer group name
    pub group: String,

    /// This member's name inside the group
    pub consumer_name: String,

    /// Maximum entries fetched per read
    pub batch_size: usize,

    /// How long a read blocks waiting for new entries
    pub block: Duration,

    /// How long `stop()` waits for in-flight processing before aborting the loop
    pub shutdown_timeout: Duration,
}

impl ConsumerConfig {
    pub fn new(stream: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            group: group.into(),
            consumer_name: format!("consumer-{}", Uuid::new_v4()),
            batch_size: 10,
            block: Duration::from_millis(2000),
            shutdown_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_consumer_name(mut self, name: impl Into<String>) -> Self {
        self.consumer_name = name.into();
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_block(mut self, block: Duration) -> Self {
        self.block = block;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}
