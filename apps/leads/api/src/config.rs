use axum_helpers::JwtConfig;
use core_config::database::DatabaseConfig;
use core_config::redis::RedisConfig;
use core_config::{AppInfo, FromEnv, app_info, env_list, server::ServerConfig};
use domain_leads::{EventsConfig, StorageConfig};

pub use core_config::Environment;

pub const DEFAULT_PORT: u16 = 8000;

/// leads-service configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub storage: StorageConfig,
    pub events: EventsConfig,
    pub jwt: JwtConfig,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env_with_port(DEFAULT_PORT)?,
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            events: EventsConfig::from_env()?,
            jwt: JwtConfig::from_env()?, // Required - fails without JWT_SECRET
            allowed_origins: env_list("ALLOWED_ORIGINS", "http://localhost:3000"),
        })
    }
}
