//! Broker consumer client
//!
//! `start()` subscribes a consumer group at the latest entry and spawns one
//! background receive loop. `stop()` signals the loop, waits for the read and
//! batch in flight to finish, then closes the session. Both are idempotent.
//!
//! A read is never cancelled midway: an entry the broker has already handed
//! to this consumer is always processed and acknowledged. `stop()` therefore
//! takes up to one `block` interval plus the batch time.
//!
//! Every entry is acknowledged after it is handled, whether processing
//! succeeded or not: a failed entry is logged and dropped.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::backend::{StreamBackend, StreamSession};
use crate::config::ConsumerConfig;
use crate::message::StreamMessage;
use crate::processor::StreamProcessor;

const MAX_BACKOFF_SECS: u64 = 30;

struct Running<S> {
    session: S,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct StreamConsumer<B: StreamBackend, P: StreamProcessor> {
    backend: B,
    processor: Arc<P>,
    config: ConsumerConfig,
    running: Mutex<Option<Running<B::Session>>>,
}

impl<B: StreamBackend, P: StreamProcessor> StreamConsumer<B, P> {
    pub fn new(backend: B, processor: Arc<P>, config: ConsumerConfig) -> Self {
        Self {
            backend,
            processor,
            config,
            running: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Subscribe and launch the receive loop. No-op when already started.
    ///
    /// Returns whether the consumer is running afterwards; subscription
    /// failures are logged, not returned.
    pub async fn start(&self) -> bool {
        let mut running = self.running.lock().await;
        if running.is_some() {
            debug!(stream = %self.config.stream, "Consumer already started");
            return true;
        }

        let session = match self.backend.open().await {
            Ok(session) => session,
            Err(e) => {
                error!(backend = self.backend.name(), error = %e, "Failed to connect stream consumer");
                return false;
            }
        };

        if let Err(e) = session
            .create_group(&self.config.stream, &self.config.group)
            .await
        {
            error!(
                stream = %self.config.stream,
                group = %self.config.group,
                error = %e,
                "Failed to subscribe consumer group"
            );
            session.close().await;
            return false;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(receive_loop(
            session.clone(),
            self.processor.clone(),
            self.config.clone(),
            shutdown_rx,
        ));

        *running = Some(Running {
            session,
            shutdown,
            task,
        });

        info!(
            stream = %self.config.stream,
            group = %self.config.group,
            consumer = %self.config.consumer_name,
            processor = self.processor.name(),
            "Stream consumer started"
        );
        true
    }

    /// Whether the receive loop is alive
    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .is_some_and(|r| !r.task.is_finished())
    }

    /// Stop the receive loop and close the session. Safe to call at any time.
    pub async fn stop(&self) {
        let Some(running) = self.running.lock().await.take() else {
            debug!("Consumer not started, nothing to stop");
            return;
        };

        let _ = running.shutdown.send(true);

        let mut task = running.task;
        match timeout(self.config.shutdown_timeout, &mut task).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Receive loop terminated abnormally"),
            Err(_) => {
                warn!(
                    timeout_ms = self.config.shutdown_timeout.as_millis() as u64,
                    "Receive loop did not finish in time, aborting"
                );
                task.abort();
            }
        }

        running.session.close().await;
        info!(stream = %self.config.stream, "Stream consumer stopped");
    }
}

async fn receive_loop<S, P>(
    session: S,
    processor: Arc<P>,
    config: ConsumerConfig,
    mut shutdown: watch::Receiver<bool>,
) where
    S: StreamSession,
    P: StreamProcessor,
{
    let mut consecutive_errors: u32 = 0;

    loop {
        if *shutdown.borrow() {
            break;
        }

        let batch = session
            .read_group(
                &config.stream,
                &config.group,
                &config.consumer_name,
                config.batch_size,
                config.block,
            )
            .await;

        match batch {
            Ok(messages) => {
                if consecutive_errors > 0 {
                    info!(consecutive_errors, "Broker connection recovered");
                    consecutive_errors = 0;
                }
                // Finish the whole batch even if shutdown was signalled meanwhile
                for message in messages {
                    handle_message(&session, processor.as_ref(), &config, message).await;
                }
            }
            Err(e) => {
                consecutive_errors += 1;
                let backoff = Duration::from_secs(2u64.pow(consecutive_errors.min(5)).min(MAX_BACKOFF_SECS));
                warn!(
                    error = %e,
                    consecutive_errors,
                    backoff_secs = backoff.as_secs(),
                    "Failed to read from stream, backing off"
                );

                if e.is_no_group() {
                    if let Err(e) = session.create_group(&config.stream, &config.group).await {
                        error!(error = %e, "Failed to recreate consumer group");
                    }
                }

                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
            }
        }
    }

    info!(stream = %config.stream, "Receive loop exited");
}

async fn handle_message<S, P>(session: &S, processor: &P, config: &ConsumerConfig, message: StreamMessage)
where
    S: StreamSession,
    P: StreamProcessor,
{
    match message.decode_json() {
        Ok(payload) => {
            let outcome = AssertUnwindSafe(processor.process(&message, &payload))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(())) => debug!(entry_id = %message.id, processor = processor.name(), "Processed message"),
                Ok(Err(e)) => error!(
                    entry_id = %message.id,
                    processor = processor.name(),
                    error = %e,
                    "Failed to process message, dropping"
                ),
                Err(_) => error!(
                    entry_id = %message.id,
                    processor = processor.name(),
                    "Processor panicked, dropping message"
                ),
            }
        }
        Err(e) => error!(entry_id = %message.id, error = %e, "Undecodable message, dropping"),
    }

    if let Err(e) = session.ack(&config.stream, &config.group, &message.id).await {
        warn!(entry_id = %message.id, error = %e, "Failed to acknowledge message");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use crate::error::StreamError;
    use crate::memory::MemoryBackend;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[derive(Default)]
    struct Recorder {
        seen: std::sync::Mutex<Vec<Value>>,
    }

    impl Recorder {
        fn seen(&self) -> Vec<Value> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StreamProcessor for Recorder {
        async fn process(&self, _message: &StreamMessage, payload: &Value) -> Result<(), StreamError> {
            if payload["fail"] == json!(true) {
                return Err(StreamError::processing("asked to fail"));
            }
            if payload["panic"] == json!(true) {
                panic!("asked to panic");
            }
            self.seen.lock().unwrap().push(payload.clone());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    /// Records like [`Recorder`] but only after sleeping
    struct Slow {
        inner: Recorder,
        delay: Duration,
    }

    #[async_trait]
    impl StreamProcessor for Slow {
        async fn process(&self, message: &StreamMessage, payload: &Value) -> Result<(), StreamError> {
            tokio::time::sleep(self.delay).await;
            self.inner.process(message, payload).await
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    fn config() -> ConsumerConfig {
        ConsumerConfig::new("new_leads", "notification_service")
            .with_consumer_name("test-consumer")
            .with_block(Duration::from_millis(50))
            .with_shutdown_timeout(Duration::from_secs(2))
    }

    fn envelope(payload: Value) -> Envelope {
        let Value::Object(map) = payload else {
            panic!("payload must be an object")
        };
        Envelope::new("new_leads", map)
    }

    async fn publish(backend: &MemoryBackend, payload: Value) {
        let session = backend.open().await.unwrap();
        session.append(&envelope(payload), 1000).await.unwrap();
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        for _ in 0..500 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not met in time");
    }

    #[tokio::test]
    async fn test_start_twice_subscribes_once() {
        let backend = MemoryBackend::new();
        let consumer = StreamConsumer::new(backend.clone(), Arc::new(Recorder::default()), config());

        assert!(consumer.start().await);
        assert!(consumer.start().await);
        assert_eq!(backend.open_count(), 1);
        assert_eq!(backend.group_create_count(), 1);
        assert!(consumer.is_running().await);

        consumer.stop().await;
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let consumer = StreamConsumer::new(MemoryBackend::new(), Arc::new(Recorder::default()), config());
        consumer.stop().await;
        consumer.stop().await;
        assert!(!consumer.is_running().await);
    }

    #[tokio::test]
    async fn test_start_fails_when_broker_down() {
        let backend = MemoryBackend::unavailable();
        let consumer = StreamConsumer::new(backend, Arc::new(Recorder::default()), config());

        assert!(!consumer.start().await);
        assert!(!consumer.is_running().await);
    }

    #[tokio::test]
    async fn test_processes_only_messages_after_subscription() {
        let backend = MemoryBackend::new();
        publish(&backend, json!({"n": 0})).await;

        let recorder = Arc::new(Recorder::default());
        let consumer = StreamConsumer::new(backend.clone(), recorder.clone(), config());
        assert!(consumer.start().await);

        publish(&backend, json!({"n": 1})).await;
        wait_for(|| recorder.seen().len() == 1).await;

        consumer.stop().await;
        assert_eq!(recorder.seen(), vec![json!({"n": 1})]);
    }

    #[tokio::test]
    async fn test_bad_messages_do_not_kill_loop() {
        let backend = MemoryBackend::new();
        let recorder = Arc::new(Recorder::default());
        let consumer = StreamConsumer::new(backend.clone(), recorder.clone(), config());
        assert!(consumer.start().await);

        publish(&backend, json!({"fail": true})).await;
        publish(&backend, json!({"panic": true})).await;
        publish(&backend, json!({"n": 2})).await;

        wait_for(|| recorder.seen().len() == 1).await;
        wait_for(|| backend.acked().len() == 3).await;
        assert!(consumer.is_running().await);

        consumer.stop().await;
        assert_eq!(recorder.seen(), vec![json!({"n": 2})]);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_acked_and_dropped() {
        let backend = MemoryBackend::new();
        let recorder = Recorder::default();

        let message = StreamMessage::new("1-0", HashMap::from([("body".to_string(), "{oops".to_string())]));
        handle_message(&backend.open().await.unwrap(), &recorder, &config(), message).await;

        assert_eq!(backend.acked(), vec!["1-0".to_string()]);
        assert!(recorder.seen().is_empty());
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let backend = MemoryBackend::new();
        let recorder = Arc::new(Recorder::default());
        let consumer = StreamConsumer::new(backend.clone(), recorder.clone(), config());

        assert!(consumer.start().await);
        consumer.stop().await;
        assert!(!consumer.is_running().await);

        assert!(consumer.start().await);
        publish(&backend, json!({"n": 3})).await;
        wait_for(|| recorder.seen().len() == 1).await;
        consumer.stop().await;
    }

    #[tokio::test]
    async fn test_stop_drains_message_being_processed() {
        let backend = MemoryBackend::new();
        let processor = Arc::new(Slow {
            inner: Recorder::default(),
            delay: Duration::from_millis(200),
        });
        let consumer = StreamConsumer::new(backend.clone(), processor.clone(), config());
        assert!(consumer.start().await);

        publish(&backend, json!({"n": 4})).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        consumer.stop().await;

        assert_eq!(processor.inner.seen(), vec![json!({"n": 4})]);
        assert_eq!(backend.acked().len(), 1);
    }

    #[tokio::test]
    async fn test_stop_during_blocked_read_keeps_delivered_entry() {
        let backend = MemoryBackend::new();
        let recorder = Arc::new(Recorder::default());
        let config = config().with_block(Duration::from_millis(500));
        let consumer = Arc::new(StreamConsumer::new(backend.clone(), recorder.clone(), config));
        assert!(consumer.start().await);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let stopping = {
            let consumer = consumer.clone();
            tokio::spawn(async move { consumer.stop().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        publish(&backend, json!({"n": 5})).await;

        stopping.await.unwrap();
        assert_eq!(recorder.seen(), vec![json!({"n": 5})]);
        assert_eq!(backend.acked().len(), 1);
    }

    #[tokio::test]
    async fn test_lost_group_is_recreated() {
        let backend = MemoryBackend::new();
        let recorder = Arc::new(Recorder::default());
        let consumer = StreamConsumer::new(backend.clone(), recorder.clone(), config());
        assert!(consumer.start().await);

        backend.drop_group("new_leads", "notification_service");
        wait_for(|| backend.group_create_count() == 2).await;

        publish(&backend, json!({"n": 6})).await;
        wait_for(|| recorder.seen().len() == 1).await;
        assert!(consumer.is_running().await);

        consumer.stop().await;
    }
}
