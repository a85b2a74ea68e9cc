//! Broker producer client
//!
//! Holds at most one broker session. `start()` opens it, `stop()` drops it,
//! and `send()` opens it lazily when needed. None of these return errors:
//! a broker outage degrades publishing to `false` results instead of failing
//! the caller.
//!
//! ```rust,ignore
//! let producer = StreamProducer::new(RedisBackend::new(url), ProducerConfig::default());
//! producer.start().await;
//! if !producer.send(&envelope).await {
//!     warn!("event not delivered");
//! }
//! producer.stop().await;
//! ```

use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::backend::{StreamBackend, StreamSession};
use crate::config::ProducerConfig;
use crate::envelope::Envelope;

pub struct StreamProducer<B: StreamBackend> {
    backend: B,
    config: ProducerConfig,
    session: RwLock<Option<B::Session>>,
}

impl<B: StreamBackend> StreamProducer<B> {
    pub fn new(backend: B, config: ProducerConfig) -> Self {
        Self {
            backend,
            config,
            session: RwLock::new(None),
        }
    }

    /// Open the broker session. No-op when already started.
    ///
    /// Returns whether the producer is started afterwards. Failures are
    /// logged and leave the producer stopped.
    pub async fn start(&self) -> bool {
        let mut session = self.session.write().await;
        if session.is_some() {
            debug!(backend = self.backend.name(), "Producer already started");
            return true;
        }

        match timeout(self.config.connect_timeout, self.backend.open()).await {
            Ok(Ok(opened)) => {
                *session = Some(opened);
                info!(backend = self.backend.name(), "Stream producer started");
                true
            }
            Ok(Err(e)) => {
                error!(backend = self.backend.name(), error = %e, "Failed to start stream producer");
                false
            }
            Err(_) => {
                error!(
                    backend = self.backend.name(),
                    timeout_ms = self.config.connect_timeout.as_millis() as u64,
                    "Timed out starting stream producer"
                );
                false
            }
        }
    }

    pub async fn is_started(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Whether the producer holds a session and the broker answers a ping.
    /// Never starts the producer.
    pub async fn health_check(&self) -> bool {
        let Some(session) = self.session.read().await.clone() else {
            return false;
        };

        match timeout(self.config.connect_timeout, session.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(backend = self.backend.name(), error = %e, "Broker ping failed");
                false
            }
            Err(_) => {
                warn!(backend = self.backend.name(), "Broker ping timed out");
                false
            }
        }
    }

    /// Send one envelope and wait for the broker to acknowledge it.
    ///
    /// Starts the producer first if needed. Returns `false` when the producer
    /// cannot be started, the send fails, or the acknowledgment does not
    /// arrive within the send timeout.
    pub async fn send(&self, envelope: &Envelope) -> bool {
        if !self.is_started().await && !self.start().await {
            warn!(topic = %envelope.topic, "Producer not started, message not sent");
            return false;
        }

        let Some(session) = self.session.read().await.clone() else {
            warn!(topic = %envelope.topic, "Producer stopped before send");
            return false;
        };

        match timeout(
            self.config.send_timeout,
            session.append(envelope, self.config.max_length),
        )
        .await
        {
            Ok(Ok(entry_id)) => {
                info!(
                    topic = %envelope.topic,
                    key = envelope.key.as_deref().unwrap_or_default(),
                    entry_id = %entry_id,
                    "Message sent"
                );
                true
            }
            Ok(Err(e)) => {
                error!(topic = %envelope.topic, error = %e, "Failed to send message");
                false
            }
            Err(_) => {
                error!(
                    topic = %envelope.topic,
                    timeout_ms = self.config.send_timeout.as_millis() as u64,
                    "Timed out waiting for broker acknowledgment"
                );
                false
            }
        }
    }

    /// Close the broker session. No-op when not started.
    pub async fn stop(&self) {
        let Some(session) = self.session.write().await.take() else {
            debug!("Producer not started, nothing to stop");
            return;
        };

        session.close().await;
        info!(backend = self.backend.name(), "Stream producer stopped");
    }
}
