//! Stream clients for event hand-off between services.
//!
//! Redis Streams play the role of the event broker: a topic is a stream key,
//! a subscription is a consumer group created at the latest entry (`$`).
//!
//! ```text
//!   StreamProducer ──send(Envelope)──▶ XADD topic ──▶ XREADGROUP ──▶ StreamConsumer
//!        │                                                              │
//!   start/stop (lazy, idempotent)                     background receive loop
//!                                                     └─▶ StreamProcessor::process
//! ```
//!
//! Both clients are generic over a [`StreamBackend`], so workflows can be
//! tested against [`MemoryBackend`] without a running Redis.
//!
//! ## Example
//!
//! ```ignore
//! use stream_worker::{Envelope, ProducerConfig, RedisBackend, StreamProducer};
//!
//! let producer = StreamProducer::new(RedisBackend::new(redis_url), ProducerConfig::default());
//! producer.start().await;
//!
//! let envelope = Envelope::new("new_leads", payload).with_key(lead_id.to_string());
//! let delivered = producer.send(&envelope).await;
//! ```

mod backend;
mod config;
mod consumer;
mod envelope;
mod error;
mod memory;
mod message;
mod processor;
mod producer;
mod redis_backend;

pub use backend::{StreamBackend, StreamSession};
pub use config::{ConsumerConfig, ProducerConfig};
pub use consumer::StreamConsumer;
pub use envelope::{fields, headers, to_json_map, Envelope, CONTENT_TYPE_JSON};
pub use error::StreamError;
pub use memory::{MemoryBackend, MemorySession};
pub use message::StreamMessage;
pub use processor::StreamProcessor;
pub use producer::StreamProducer;
pub use redis_backend::{RedisBackend, RedisSession};
