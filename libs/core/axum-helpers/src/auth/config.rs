//! Token signing configuration

use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};
use jsonwebtoken::Algorithm;

const MIN_SECRET_LEN: usize = 32;

/// JWT signing configuration.
///
/// Loaded from environment variables:
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_ALGORITHM` (`HS256` default; `HS384` and `HS512` accepted)
/// - `ACCESS_TOKEN_EXPIRE_MINUTES` (default 30)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
}

impl JwtConfig {
    /// HS256 config with the default 30 minute expiry.
    ///
    /// # Panics
    /// Panics if the secret is shorter than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= MIN_SECRET_LEN,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            algorithm: Algorithm::HS256,
            access_token_expire_minutes: 30,
        }
    }

    pub fn with_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expire_minutes = minutes;
        self
    }
}

fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(ConfigError::ParseError {
            key: "JWT_ALGORITHM".to_string(),
            details: format!("unsupported algorithm '{}', expected HS256, HS384 or HS512", other),
        }),
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        let algorithm = parse_algorithm(&env_or_default("JWT_ALGORITHM", "HS256"))?;
        let access_token_expire_minutes = env_parse("ACCESS_TOKEN_EXPIRE_MINUTES", 30)?;

        Ok(Self {
            secret,
            algorithm,
            access_token_expire_minutes,
        })
    }
}
