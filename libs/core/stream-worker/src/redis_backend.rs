//! Redis Streams implementation of [`StreamBackend`]

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::RedisResult;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::backend::{StreamBackend, StreamSession};
use crate::envelope::Envelope;
use crate::error::StreamError;
use crate::message::StreamMessage;

type StreamReadReply = Vec<(String, Vec<(String, Vec<(String, String)>)>)>;

/// Connects to Redis on [`open`](StreamBackend::open)
///
/// Sessions carry no client-side response timeout so that `XREADGROUP BLOCK`
/// is bounded by the server. Producers wrap their calls in their own timeouts.
#[derive(Debug, Clone)]
pub struct RedisBackend {
    url: String,
}

impl RedisBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl StreamBackend for RedisBackend {
    type Session = RedisSession;

    async fn open(&self) -> Result<RedisSession, StreamError> {
        let config = ConnectionManagerConfig::new().set_response_timeout(None);
        let conn = database::redis::connect_with_config(&self.url, config).await?;
        Ok(RedisSession::new(conn))
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

/// Session over a reconnecting [`ConnectionManager`]
#[derive(Clone)]
pub struct RedisSession {
    conn: ConnectionManager,
}

impl RedisSession {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn parse_reply(reply: StreamReadReply) -> Vec<StreamMessage> {
        reply
            .into_iter()
            .flat_map(|(_stream, entries)| entries)
            .map(|(id, pairs)| StreamMessage::new(id, pairs.into_iter().collect::<HashMap<_, _>>()))
            .collect()
    }
}

#[async_trait]
impl StreamSession for RedisSession {
    async fn append(&self, envelope: &Envelope, max_length: usize) -> Result<String, StreamError> {
        let mut conn = self.conn.clone();

        let mut cmd = redis::cmd("XADD");
        cmd.arg(&envelope.topic)
            .arg("MAXLEN")
            .arg("~")
            .arg(max_length)
            .arg("*");
        for (field, value) in envelope.to_fields()? {
            cmd.arg(field).arg(value);
        }

        let entry_id: String = cmd.query_async(&mut conn).await?;

        debug!(stream = %envelope.topic, entry_id = %entry_id, "Appended entry");
        Ok(entry_id)
    }

    async fn create_group(&self, stream: &str, group: &str) -> Result<(), StreamError> {
        let mut conn = self.conn.clone();

        let result: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(stream)
            .arg(group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result.map_err(StreamError::from) {
            Ok(()) => {
                info!(stream = %stream, group = %group, "Created consumer group");
                Ok(())
            }
            Err(e) if e.is_busy_group() => {
                debug!(stream = %stream, group = %group, "Consumer group already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn read_group(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
        block: Duration,
    ) -> Result<Vec<StreamMessage>, StreamError> {
        let mut conn = self.conn.clone();

        let result: RedisResult<Option<StreamReadReply>> = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(group)
            .arg(consumer)
            .arg("COUNT")
            .arg(count)
            .arg("BLOCK")
            .arg(block.as_millis() as u64)
            .arg("STREAMS")
            .arg(stream)
            .arg(">")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(Some(reply)) => Ok(Self::parse_reply(reply)),
            Ok(None) => Ok(vec![]),
            Err(e) => Err(StreamError::Redis(e)),
        }
    }

    async fn ack(&self, stream: &str, group: &str, id: &str) -> Result<(), StreamError> {
        let mut conn = self.conn.clone();

        let _: i64 = redis::cmd("XACK")
            .arg(stream)
            .arg(group)
            .arg(id)
            .query_async(&mut conn)
            .await?;

        debug!(stream = %stream, entry_id = %id, "Acknowledged entry");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StreamError> {
        let mut conn = self.conn.clone();
        database::redis::check_health(&mut conn)
            .await
            .map_err(|e| StreamError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply_flattens_entries() {
        let reply: StreamReadReply = vec![(
            "new_leads".to_string(),
            vec![
                (
                    "1-0".to_string(),
                    vec![("body".to_string(), "{}".to_string())],
                ),
                (
                    "2-0".to_string(),
                    vec![
                        ("key".to_string(), "lead-2".to_string()),
                        ("body".to_string(), "{}".to_string()),
                    ],
                ),
            ],
        )];

        let messages = RedisSession::parse_reply(reply);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "1-0");
        assert_eq!(messages[1].key(), Some("lead-2"));
    }

    #[tokio::test]
    async fn test_open_fails_for_unreachable_url() {
        let backend = RedisBackend::new("not-a-redis-url");
        assert!(backend.open().await.is_err());
    }
}
