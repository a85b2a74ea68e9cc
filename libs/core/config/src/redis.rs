use crate::{env_or_default, ConfigError, FromEnv};

/// Redis connection used as the event broker.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl FromEnv for RedisConfig {
    /// REDIS_URL, defaulting to a local instance
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("REDIS_URL", "redis://127.0.0.1:6379"),
        })
    }
}
