//! Redis backend against a scripted RESP server.
//!
//! The server answers the first `XREADGROUP` slower than the client library's
//! default response timeout, the way a real broker does when an entry arrives
//! late in a long `BLOCK`.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stream_worker::{ConsumerConfig, RedisBackend, StreamConsumer, StreamError, StreamMessage, StreamProcessor};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

const FIRST_READ_DELAY: Duration = Duration::from_millis(1200);
const IDLE_READ_DELAY: Duration = Duration::from_millis(200);

#[derive(Default)]
struct ServerState {
    reads: usize,
    acked: Vec<String>,
}

#[derive(Default)]
struct Counter {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl StreamProcessor for Counter {
    async fn process(&self, message: &StreamMessage, _payload: &Value) -> Result<(), StreamError> {
        self.seen.lock().unwrap().push(message.id.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}

fn bulk(value: &str) -> String {
    format!("${}\r\n{}\r\n", value.len(), value)
}

fn entry_reply() -> String {
    let body = r#"{"event_type":"lead.created","lead_data":{"email":"john@test.com"}}"#;
    format!(
        "*1\r\n*2\r\n{}*1\r\n*2\r\n{}*2\r\n{}{}",
        bulk("new_leads"),
        bulk("1-0"),
        bulk("body"),
        bulk(body)
    )
}

/// Read one RESP array of bulk strings; `None` once the client hangs up
async fn read_command<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> Option<Vec<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await.ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
        let mut buf = vec![0u8; len + 2];
        reader.read_exact(&mut buf).await.ok()?;
        buf.truncate(len);
        args.push(String::from_utf8(buf).ok()?);
    }
    Some(args)
}

async fn spawn_server(state: Arc<Mutex<ServerState>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let state = state.clone();
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut reader = BufReader::new(read);

                while let Some(args) = read_command(&mut reader).await {
                    let reply = match args[0].to_uppercase().as_str() {
                        "PING" => "+PONG\r\n".to_string(),
                        "XACK" => {
                            state.lock().unwrap().acked.push(args[3].clone());
                            ":1\r\n".to_string()
                        }
                        "XREADGROUP" => {
                            let first = {
                                let mut state = state.lock().unwrap();
                                state.reads += 1;
                                state.reads == 1
                            };
                            if first {
                                tokio::time::sleep(FIRST_READ_DELAY).await;
                                entry_reply()
                            } else {
                                tokio::time::sleep(IDLE_READ_DELAY).await;
                                "*-1\r\n".to_string()
                            }
                        }
                        _ => "+OK\r\n".to_string(),
                    };
                    if write.write_all(reply.as_bytes()).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    format!("redis://{}", addr)
}

#[tokio::test]
async fn test_slow_blocking_read_is_delivered_and_acked() {
    let state = Arc::new(Mutex::new(ServerState::default()));
    let url = spawn_server(state.clone()).await;

    let counter = Arc::new(Counter::default());
    let config = ConsumerConfig::new("new_leads", "notification_service")
        .with_consumer_name("test-consumer")
        .with_block(Duration::from_secs(5));
    let consumer = StreamConsumer::new(RedisBackend::new(url), counter.clone(), config);
    assert!(consumer.start().await);

    for _ in 0..50 {
        if !state.lock().unwrap().acked.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    consumer.stop().await;

    assert_eq!(*counter.seen.lock().unwrap(), vec!["1-0".to_string()]);
    assert_eq!(state.lock().unwrap().acked, vec!["1-0".to_string()]);
}

#[tokio::test]
async fn test_stop_waits_for_blocked_read() {
    let state = Arc::new(Mutex::new(ServerState::default()));
    let url = spawn_server(state.clone()).await;

    let counter = Arc::new(Counter::default());
    let config = ConsumerConfig::new("new_leads", "notification_service").with_block(Duration::from_secs(5));
    let consumer = StreamConsumer::new(RedisBackend::new(url), counter.clone(), config);
    assert!(consumer.start().await);

    tokio::time::sleep(Duration::from_millis(300)).await;
    consumer.stop().await;

    assert_eq!(counter.seen.lock().unwrap().len(), 1);
    assert_eq!(state.lock().unwrap().acked, vec!["1-0".to_string()]);
}
