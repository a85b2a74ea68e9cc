//! Leads-service configuration for object storage and event publishing

use core_config::{ConfigError, FromEnv, env_flag, env_or_default, env_parse};
use std::time::Duration;

/// S3-compatible object storage (MinIO) settings
///
/// - `MINIO_ENDPOINT` (default `localhost:9000`, scheme optional)
/// - `MINIO_ACCESS_KEY` / `MINIO_SECRET_KEY` (default `minioadmin`)
/// - `MINIO_BUCKET_NAME` (default `leads`)
/// - `MINIO_SECURE` (default `false`)
/// - `MINIO_URL` (default `http://localhost:9001`): console base used for resume links
/// - `MINIO_REGION` (default `us-east-1`)
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub secure: bool,
    pub console_url: String,
    pub region: String,
}

impl StorageConfig {
    /// Endpoint with a scheme, as the S3 client expects
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            return self.endpoint.clone();
        }
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}", scheme, self.endpoint)
    }
}

impl FromEnv for StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: env_or_default("MINIO_ENDPOINT", "localhost:9000"),
            access_key: env_or_default("MINIO_ACCESS_KEY", "minioadmin"),
            secret_key: env_or_default("MINIO_SECRET_KEY", "minioadmin"),
            bucket: env_or_default("MINIO_BUCKET_NAME", "leads"),
            secure: env_flag("MINIO_SECURE", false)?,
            console_url: env_or_default("MINIO_URL", "http://localhost:9001"),
            region: env_or_default("MINIO_REGION", "us-east-1"),
        })
    }
}

/// Where and how lead events are published
#[derive(Clone, Debug)]
pub struct EventsConfig {
    /// `NEW_LEADS_TOPIC` (default `new_leads`)
    pub topic: String,
    /// `STREAM_MAX_LENGTH` (default 100000)
    pub max_length: usize,
    /// `BROKER_SEND_TIMEOUT_SECS` (default 5)
    pub send_timeout: Duration,
}

impl FromEnv for EventsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            topic: env_or_default("NEW_LEADS_TOPIC", "new_leads"),
            max_length: env_parse("STREAM_MAX_LENGTH", 100_000)?,
            send_timeout: Duration::from_secs(env_parse("BROKER_SEND_TIMEOUT_SECS", 5)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_defaults() {
        temp_env::with_vars_unset(
            [
                "MINIO_ENDPOINT",
                "MINIO_BUCKET_NAME",
                "MINIO_SECURE",
                "MINIO_URL",
            ],
            || {
                let config = StorageConfig::from_env().unwrap();
                assert_eq!(config.bucket, "leads");
                assert_eq!(config.console_url, "http://localhost:9001");
                assert_eq!(config.endpoint_url(), "http://localhost:9000");
            },
        );
    }

    #[test]
    fn test_storage_secure_endpoint() {
        temp_env::with_vars(
            [
                ("MINIO_ENDPOINT", Some("minio.internal:443")),
                ("MINIO_SECURE", Some("true")),
            ],
            || {
                let config = StorageConfig::from_env().unwrap();
                assert_eq!(config.endpoint_url(), "https://minio.internal:443");
            },
        );
    }

    #[test]
    fn test_events_config() {
        temp_env::with_vars(
            [
                ("NEW_LEADS_TOPIC", Some("leads_v2")),
                ("BROKER_SEND_TIMEOUT_SECS", Some("2")),
                ("STREAM_MAX_LENGTH", None),
            ],
            || {
                let config = EventsConfig::from_env().unwrap();
                assert_eq!(config.topic, "leads_v2");
                assert_eq!(config.max_length, 100_000);
                assert_eq!(config.send_timeout, Duration::from_secs(2));
            },
        );
    }

    #[test]
    fn test_events_config_rejects_bad_timeout() {
        temp_env::with_var("BROKER_SEND_TIMEOUT_SECS", Some("soon"), || {
            assert!(EventsConfig::from_env().is_err());
        });
    }
}
