//! In-process broker for tests and local runs without Redis

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;

use crate::backend::{StreamBackend, StreamSession};
use crate::envelope::Envelope;
use crate::error::StreamError;
use crate::message::StreamMessage;

#[derive(Default)]
struct MemoryStream {
    entries: Vec<StreamMessage>,
    /// Next unread entry index per consumer group
    cursors: HashMap<String, usize>,
}

struct MemoryBroker {
    streams: Mutex<HashMap<String, MemoryStream>>,
    acked: Mutex<Vec<String>>,
    appended: Notify,
    available: AtomicBool,
    opens: AtomicUsize,
    groups_created: AtomicUsize,
    sequence: AtomicUsize,
}

/// Shared in-memory broker. Clones observe the same streams.
#[derive(Clone)]
pub struct MemoryBackend {
    broker: Arc<MemoryBroker>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            broker: Arc::new(MemoryBroker {
                streams: Mutex::new(HashMap::new()),
                acked: Mutex::new(Vec::new()),
                appended: Notify::new(),
                available: AtomicBool::new(true),
                opens: AtomicUsize::new(0),
                groups_created: AtomicUsize::new(0),
                sequence: AtomicUsize::new(0),
            }),
        }
    }

    /// A backend whose broker refuses connections until [`set_available`](Self::set_available)
    pub fn unavailable() -> Self {
        let backend = Self::new();
        backend.set_available(false);
        backend
    }

    /// Simulate the broker going down or coming back
    pub fn set_available(&self, available: bool) {
        self.broker.available.store(available, Ordering::SeqCst);
    }

    /// Number of sessions opened so far
    pub fn open_count(&self) -> usize {
        self.broker.opens.load(Ordering::SeqCst)
    }

    /// Number of `create_group` calls received
    pub fn group_create_count(&self) -> usize {
        self.broker.groups_created.load(Ordering::SeqCst)
    }

    /// All entries ever appended to `stream`
    pub fn entries(&self, stream: &str) -> Vec<StreamMessage> {
        lock(&self.broker.streams)
            .get(stream)
            .map(|s| s.entries.clone())
            .unwrap_or_default()
    }

    /// Forget a consumer group, as a broker restart without persistence would
    pub fn drop_group(&self, stream: &str, group: &str) {
        if let Some(state) = lock(&self.broker.streams).get_mut(stream) {
            state.cursors.remove(group);
        }
    }

    /// IDs acknowledged by any consumer, in order
    pub fn acked(&self) -> Vec<String> {
        lock(&self.broker.acked).clone()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamBackend for MemoryBackend {
    type Session = MemorySession;

    async fn open(&self) -> Result<MemorySession, StreamError> {
        self.broker.opens.fetch_add(1, Ordering::SeqCst);
        self.broker.ensure_available()?;
        Ok(MemorySession {
            broker: self.broker.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

impl MemoryBroker {
    fn ensure_available(&self) -> Result<(), StreamError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StreamError::Unavailable("in-memory broker is down".to_string()))
        }
    }

    fn take_batch(&self, stream: &str, group: &str, count: usize) -> Result<Vec<StreamMessage>, StreamError> {
        let mut streams = lock(&self.streams);
        let state = streams.entry(stream.to_string()).or_default();
        let cursor = *state
            .cursors
            .get(group)
            .ok_or_else(|| StreamError::MissingGroup(group.to_string()))?;

        let end = (cursor + count).min(state.entries.len());
        let batch = state.entries[cursor..end].to_vec();
        state.cursors.insert(group.to_string(), end);
        Ok(batch)
    }
}

/// Session handle onto a [`MemoryBackend`]
#[derive(Clone)]
pub struct MemorySession {
    broker: Arc<MemoryBroker>,
}

#[async_trait]
impl StreamSession for MemorySession {
    async fn append(&self, envelope: &Envelope, _max_length: usize) -> Result<String, StreamError> {
        self.broker.ensure_available()?;

        let seq = self.broker.sequence.fetch_add(1, Ordering::SeqCst);
        let id = format!("{}-{}", Utc::now().timestamp_millis(), seq);
        let message = StreamMessage::new(id.clone(), envelope.to_fields()?.into_iter().collect());

        lock(&self.broker.streams)
            .entry(envelope.topic.clone())
            .or_default()
            .entries
            .push(message);
        self.broker.appended.notify_waiters();

        Ok(id)
    }

    async fn create_group(&self, stream: &str, group: &str) -> Result<(), StreamError> {
        self.broker.ensure_available()?;
        self.broker.groups_created.fetch_add(1, Ordering::SeqCst);

        let mut streams = lock(&self.broker.streams);
        let state = streams.entry(stream.to_string()).or_default();
        let latest = state.entries.len();
        state.cursors.entry(group.to_string()).or_insert(latest);
        Ok(())
    }

    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        _consumer: &str,
        count: usize,
        block: Duration,
    ) -> Result<Vec<StreamMessage>, StreamError> {
        self.broker.ensure_available()?;

        let notified = self.broker.appended.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        let batch = self.broker.take_batch(stream, group, count)?;
        if !batch.is_empty() {
            return Ok(batch);
        }

        if tokio::time::timeout(block, notified).await.is_err() {
            return Ok(vec![]);
        }
        self.broker.take_batch(stream, group, count)
    }

    async fn ack(&self, _stream: &str, _group: &str, id: &str) -> Result<(), StreamError> {
        lock(&self.broker.acked).push(id.to_string());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StreamError> {
        self.broker.ensure_available()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
