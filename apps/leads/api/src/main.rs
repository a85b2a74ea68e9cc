use axum::Router;
use axum_helpers::JwtAuth;
use axum_helpers::server::{build_cors_layer, create_production_app, with_common_layers};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_leads::{EventPublisher, LeadService, PgLeadRepository, S3ResumeStorage};
use domain_users::{PgUserRepository, UserService};
use std::sync::Arc;
use std::time::Duration;
use stream_worker::{ProducerConfig, RedisBackend, StreamProducer};
use tracing::{error, info, warn};
use utoipa_scalar::{Scalar, Servable};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);
    info!(app = config.app.name, version = config.app.version, "Starting leads-service");

    let db = database::postgres::connect_with_retry(&config.database.url, None)
        .await
        .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;
    database::postgres::run_migrations::<migration::Migrator>(&db, config.app.name)
        .await
        .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

    let storage = Arc::new(S3ResumeStorage::new(&config.storage).await);
    if let Err(e) = storage.ensure_bucket().await {
        warn!(bucket = %config.storage.bucket, error = %e, "Resume bucket unavailable, starting degraded");
    }

    // A broker outage must not block startup; send() retries the connection lazily
    let producer_config = ProducerConfig::default()
        .with_max_length(config.events.max_length)
        .with_send_timeout(config.events.send_timeout);
    let producer = Arc::new(StreamProducer::new(
        RedisBackend::new(config.redis.url.clone()),
        producer_config,
    ));
    if !producer.start().await {
        warn!(url = %config.redis.url, "Broker unavailable at startup, lead events will be retried per request");
    }

    let auth = JwtAuth::new(&config.jwt);
    let publisher = EventPublisher::new(Arc::clone(&producer), config.events.topic.clone());
    let leads = LeadService::from_shared(
        Arc::new(PgLeadRepository::new(db.clone())),
        Arc::clone(&storage),
        Arc::new(publisher),
    );
    let users = UserService::new(PgUserRepository::new(db.clone()), auth.clone());

    let state = AppState {
        config: config.clone(),
        db: db.clone(),
        storage,
        producer: Arc::clone(&producer),
    };

    let cors = build_cors_layer(&config.allowed_origins)?;
    let router = Router::new()
        .nest("/api/v1", api::routes(leads, users, auth))
        .merge(api::health_router(state))
        .merge(Scalar::with_url("/docs", openapi::openapi()));
    let app = with_common_layers(router, cors);

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: stopping producer and closing database connections");
        producer.stop().await;
        match db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("leads-service shutdown complete");
    Ok(())
}
