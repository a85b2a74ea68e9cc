use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{ResumeStorage, StorageError, browser_url};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// In-memory object store (for development/testing)
#[derive(Debug, Clone)]
pub struct InMemoryResumeStorage {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    available: Arc<AtomicBool>,
    console_url: String,
    bucket: String,
}

impl InMemoryResumeStorage {
    pub fn new(console_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
            console_url: console_url.into(),
            bucket: bucket.into(),
        }
    }

    /// Make every call fail with a backend error until switched back
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(path)
            .map(|o| o.content_type.clone())
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    fn ensure_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Backend("in-memory storage is down".to_string()))
        }
    }
}

impl Default for InMemoryResumeStorage {
    fn default() -> Self {
        Self::new("http://localhost:9001", "leads")
    }
}

#[async_trait]
impl ResumeStorage for InMemoryResumeStorage {
    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.ensure_available()?;
        self.objects.write().await.insert(
            path.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Bytes, StorageError> {
        self.ensure_available()?;
        self.objects
            .read()
            .await
            .get(path)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        self.ensure_available()
    }

    fn browser_url(&self, path: &str) -> String {
        browser_url(&self.console_url, &self.bucket, path)
    }
}
