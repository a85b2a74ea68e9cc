use database::postgres::DatabaseConnection;
use domain_notifications::{LeadCreatedProcessor, SmtpProvider};
use std::sync::Arc;
use stream_worker::{RedisBackend, StreamConsumer};

pub type LeadConsumer = StreamConsumer<RedisBackend, LeadCreatedProcessor<SmtpProvider>>;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// `None` when postgres was unreachable at startup
    pub db: Option<DatabaseConnection>,
    pub consumer: Arc<LeadConsumer>,
}
