//! Shared handles owned by the running leads-service.

use database::postgres::DatabaseConnection;
use domain_leads::{EventPublisher, LeadService, PgLeadRepository, S3ResumeStorage};
use std::sync::Arc;
use stream_worker::{RedisBackend, StreamProducer};

pub type Leads = LeadService<PgLeadRepository, S3ResumeStorage, EventPublisher<RedisBackend>>;

/// Cloned into the health handler; every field is an `Arc` or a pooled handle.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: DatabaseConnection,
    pub storage: Arc<S3ResumeStorage>,
    pub producer: Arc<StreamProducer<RedisBackend>>,
}
