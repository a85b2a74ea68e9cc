use redis::Client;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use tracing::info;

use crate::common::{RetryConfig, retry, retry_with_backoff};

/// Open a reconnecting [`ConnectionManager`] and verify it with `PING`.
pub async fn connect(url: &str) -> redis::RedisResult<ConnectionManager> {
    connect_with_config(url, ConnectionManagerConfig::new()).await
}

/// [`connect`] with explicit manager settings.
///
/// Connections that issue blocking commands (`XREADGROUP ... BLOCK`) need a
/// response timeout longer than the block, or none at all.
pub async fn connect_with_config(
    url: &str,
    config: ConnectionManagerConfig,
) -> redis::RedisResult<ConnectionManager> {
    let client = Client::open(url)?;
    let manager = ConnectionManager::new_with_config(client, config).await?;

    let mut conn = manager.clone();
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;

    info!("Connected to Redis");
    Ok(manager)
}

/// [`connect`] with exponential backoff
pub async fn connect_with_retry(
    url: &str,
    retry_config: Option<RetryConfig>,
) -> redis::RedisResult<ConnectionManager> {
    match retry_config {
        Some(config) => retry_with_backoff(|| connect(url), config).await,
        None => retry(|| connect(url)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let err = connect("not-a-redis-url").await.unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
