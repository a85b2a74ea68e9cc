//! In-memory email provider.
//!
//! Records every message instead of delivering it. Individual recipients can
//! be marked as failing to exercise partial-delivery paths.

use super::{EmailContent, EmailProvider};
use crate::error::{NotificationError, NotificationResult};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct InMemoryEmailProvider {
    sent: Arc<Mutex<Vec<EmailContent>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl InMemoryEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `recipient` fail
    pub fn fail_for(&self, recipient: impl Into<String>) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(recipient.into());
        }
    }

    /// Messages accepted so far, in send order
    pub fn sent(&self) -> Vec<EmailContent> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<EmailContent> {
        self.sent()
            .into_iter()
            .filter(|email| email.to_email == recipient)
            .collect()
    }
}

#[async_trait]
impl EmailProvider for InMemoryEmailProvider {
    async fn send(&self, email: &EmailContent) -> NotificationResult<()> {
        let should_fail = self
            .failing
            .lock()
            .map(|failing| failing.contains(&email.to_email))
            .unwrap_or(false);
        if should_fail {
            return Err(NotificationError::ProviderError(format!(
                "Delivery to {} rejected",
                email.to_email
            )));
        }

        self.sent
            .lock()
            .map_err(|e| NotificationError::ProviderError(e.to_string()))?
            .push(email.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "InMemory"
    }
}
