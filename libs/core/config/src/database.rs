use crate::{env_or_default, env_parse, ConfigError, FromEnv};
use std::env;

/// PostgreSQL connection settings.
///
/// `DATABASE_URL` wins when set; otherwise the URL is assembled from the
/// `POSTGRES_*` variables.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl FromEnv for DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        if let Ok(url) = env::var("DATABASE_URL") {
            return Ok(Self { url });
        }

        let server = env_or_default("POSTGRES_SERVER", "localhost");
        let port: u16 = env_parse("POSTGRES_PORT", 5432)?;
        let user = env_or_default("POSTGRES_USER", "postgres");
        let password = env_or_default("POSTGRES_PASSWORD", "postgres");
        let db = env_or_default("POSTGRES_DB", "alma_leads");

        Ok(Self {
            url: format!("postgresql://{user}:{password}@{server}:{port}/{db}"),
        })
    }
}
