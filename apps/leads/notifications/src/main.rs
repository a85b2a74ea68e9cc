use axum_helpers::server::{build_cors_layer, create_production_app, with_common_layers};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::RetryConfig;
use domain_notifications::{LeadCreatedProcessor, NotificationService, SmtpProvider, TemplateEngine};
use std::sync::Arc;
use std::time::Duration;
use stream_worker::{RedisBackend, StreamConsumer};
use tracing::{error, info, warn};

mod api;
mod config;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);
    info!(app = config.app.name, version = config.app.version, "Starting notifications-service");

    // Postgres is only reported on; the consumer runs without it
    let db = match database::postgres::connect_with_retry(
        &config.database.url,
        Some(RetryConfig::new().with_max_retries(3)),
    )
    .await
    {
        Ok(db) => Some(db),
        Err(e) => {
            warn!(error = %e, "PostgreSQL unavailable, health will report it disconnected");
            None
        }
    };

    let provider = SmtpProvider::new(config.smtp.clone())
        .map_err(|e| eyre::eyre!("SMTP provider setup failed: {}", e))?;
    let templates = TemplateEngine::new().map_err(|e| eyre::eyre!("Template setup failed: {}", e))?;
    let service = NotificationService::new(Arc::new(provider), templates, config.smtp.attorney_email.clone());

    let consumer = Arc::new(StreamConsumer::new(
        RedisBackend::new(config.redis.url.clone()),
        Arc::new(LeadCreatedProcessor::new(service)),
        config.consumer.to_consumer_config(),
    ));

    if consumer.start().await {
        info!(
            topic = %config.consumer.topic,
            group = %config.consumer.group,
            consumer = %config.consumer.consumer_name,
            "Lead consumer started"
        );
    } else {
        error!(url = %config.redis.url, "Lead consumer failed to start");
    }

    let state = AppState {
        config: config.clone(),
        db: db.clone(),
        consumer: Arc::clone(&consumer),
    };

    let cors = build_cors_layer(&["*".to_string()])?;
    let app = with_common_layers(api::routes(state), cors);

    create_production_app(app, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: draining lead consumer");
        consumer.stop().await;
        if let Some(db) = db {
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => error!("Error closing PostgreSQL: {}", e),
            }
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("notifications-service shutdown complete");
    Ok(())
}
