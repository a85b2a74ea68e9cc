//! Leads Domain
//!
//! Intake and follow-up of prospective clients: a lead submits a form with a
//! resume, the resume goes to object storage, the record goes to Postgres and
//! a `lead.created` event goes to the broker for the notifications service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← multipart intake, bearer-protected listing and updates
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌───────────────┐
//! │   Service   │─────▶│ ResumeStorage │  ← S3/MinIO or in-memory
//! └──┬───────┬──┘      └───────────────┘
//!    │       │
//!    │  ┌────▼───────────────┐
//!    │  │ LeadEventPublisher │  ← best-effort, over stream-worker
//!    │  └────────────────────┘
//! ┌──▼──────────┐
//! │ Repository  │  ← Postgres or in-memory
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_leads::{handlers, InMemoryLeadRepository, InMemoryResumeStorage, LeadService};
//!
//! let service = LeadService::new(InMemoryLeadRepository::new(), InMemoryResumeStorage::default(), publisher);
//! let router = handlers::router(service, jwt_auth);
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod publisher;
pub mod repository;
pub mod service;
pub mod storage;

pub use config::{EventsConfig, StorageConfig};
pub use error::{LeadError, LeadResult};
pub use events::{LEAD_CREATED, LeadCreatedEvent};
pub use models::{
    CreateLead, Lead, LeadListResponse, LeadResponse, LeadStatus, LeadStatusUpdateRequest,
    PaginationQuery, ResumeUpload, UpdateLead,
};
pub use postgres::PgLeadRepository;
pub use publisher::{EventPublisher, LeadEventPublisher};
pub use repository::{InMemoryLeadRepository, LeadRepository};
pub use service::LeadService;
pub use storage::{InMemoryResumeStorage, ResumeStorage, S3ResumeStorage, StorageError};
