//! Email provider implementations.
//!
//! This module contains the `EmailProvider` trait, the lettre-backed SMTP
//! provider and an in-memory provider for tests.

mod memory;
mod smtp;

pub use memory::InMemoryEmailProvider;
pub use smtp::SmtpProvider;

use crate::error::NotificationResult;
use async_trait::async_trait;

/// Email content ready for sending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailContent {
    /// Recipient email address.
    pub to_email: String,
    /// Email subject.
    pub subject: String,
    /// HTML body content.
    pub html_body: String,
}

/// Trait for email sending providers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync + 'static {
    /// Send an email.
    async fn send(&self, email: &EmailContent) -> NotificationResult<()>;

    /// Get the provider name for logging.
    fn name(&self) -> &'static str;
}
