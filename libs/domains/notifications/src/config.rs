use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use std::time::Duration;

/// SMTP transport and fixed addresses.
///
/// Loaded from environment variables:
/// - `SMTP_HOST` (default smtp.gmail.com), `SMTP_PORT` (587)
/// - `SMTP_USER`, `SMTP_PASSWORD` (empty disables authentication)
/// - `FROM_EMAIL` (notifications@alma.com), `ATTORNEY_EMAIL` (attorney@alma.com)
/// - `SMTP_TIMEOUT_SECS` (10)
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub attorney_email: String,
    pub timeout: Duration,
}

impl SmtpConfig {
    /// Credentials are only sent when a username is configured
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from_email: "notifications@alma.com".to_string(),
            attorney_email: "attorney@alma.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl FromEnv for SmtpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env_or_default("SMTP_HOST", "smtp.gmail.com"),
            port: env_parse("SMTP_PORT", 587)?,
            username: env_or_default("SMTP_USER", ""),
            password: env_or_default("SMTP_PASSWORD", ""),
            from_email: env_or_default("FROM_EMAIL", "notifications@alma.com"),
            attorney_email: env_or_default("ATTORNEY_EMAIL", "attorney@alma.com"),
            timeout: Duration::from_secs(env_parse("SMTP_TIMEOUT_SECS", 10)?),
        })
    }
}
