//! Notifications Domain
//!
//! Turns `lead.created` events into two emails: a notification for the
//! attorney on duty and a confirmation for the prospect.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │ StreamConsumer       │  ← stream-worker, consumer group on the lead topic
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │ LeadCreatedProcessor │  ← filters on event_type, extracts lead_data
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │ NotificationService  │  ← two isolated sends, partial success logged
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐
//! │ TemplateEngine       │  ← handlebars HTML bodies
//! │ EmailProvider        │  ← SMTP via lettre
//! └──────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::*;
//!
//! let smtp = SmtpConfig::from_env()?;
//! let attorney = smtp.attorney_email.clone();
//! let service = NotificationService::new(Arc::new(SmtpProvider::new(smtp)?), TemplateEngine::new()?, attorney);
//! let consumer = StreamConsumer::new(backend, Arc::new(LeadCreatedProcessor::new(service)), consumer_config);
//! consumer.start().await;
//! ```

pub mod config;
pub mod error;
pub mod processor;
pub mod providers;
pub mod service;
pub mod templates;

pub use config::SmtpConfig;
pub use error::{NotificationError, NotificationResult};
pub use processor::{LEAD_CREATED, LeadCreatedProcessor};
pub use providers::{EmailContent, EmailProvider, InMemoryEmailProvider, SmtpProvider};
pub use service::NotificationService;
pub use templates::TemplateEngine;
