use core_config::database::DatabaseConfig;
use core_config::redis::RedisConfig;
use core_config::{AppInfo, ConfigError, FromEnv, app_info, env_or_default, env_parse, server::ServerConfig};
use domain_notifications::SmtpConfig;
use std::time::Duration;
use stream_worker::ConsumerConfig;

pub use core_config::Environment;

pub const DEFAULT_PORT: u16 = 8001;

/// Consumer group membership on the lead topic
///
/// - `NEW_LEADS_TOPIC` (default `new_leads`)
/// - `CONSUMER_GROUP` (default `notification_service`)
/// - `CONSUMER_NAME` (default `notifications-{HOSTNAME}`, or `notifications-1`)
/// - `CONSUMER_BLOCK_MS` (default 5000)
/// - `CONSUMER_BATCH_SIZE` (default 10)
#[derive(Clone, Debug)]
pub struct ConsumerSettings {
    pub topic: String,
    pub group: String,
    pub consumer_name: String,
    pub block: Duration,
    pub batch_size: usize,
}

impl ConsumerSettings {
    pub fn to_consumer_config(&self) -> ConsumerConfig {
        ConsumerConfig::new(&self.topic, &self.group)
            .with_consumer_name(&self.consumer_name)
            .with_block(self.block)
            .with_batch_size(self.batch_size)
    }
}

fn default_consumer_name() -> String {
    match std::env::var("HOSTNAME") {
        Ok(host) if !host.trim().is_empty() => format!("notifications-{}", host.trim()),
        _ => "notifications-1".to_string(),
    }
}

impl FromEnv for ConsumerSettings {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            topic: env_or_default("NEW_LEADS_TOPIC", "new_leads"),
            group: env_or_default("CONSUMER_GROUP", "notification_service"),
            consumer_name: env_or_default("CONSUMER_NAME", &default_consumer_name()),
            block: Duration::from_millis(env_parse("CONSUMER_BLOCK_MS", 5000)?),
            batch_size: env_parse("CONSUMER_BATCH_SIZE", 10)?,
        })
    }
}

/// notifications-service configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub consumer: ConsumerSettings,
    pub smtp: SmtpConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env_with_port(DEFAULT_PORT)?,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            consumer: ConsumerSettings::from_env()?,
            smtp: SmtpConfig::from_env()?,
        })
    }
}
