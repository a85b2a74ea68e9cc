//! Redis connector used by the stream producer and consumer

mod connector;
mod health;

pub use connector::{connect, connect_with_config, connect_with_retry};
pub use health::check_health;

pub use redis::aio::{ConnectionManager, ConnectionManagerConfig};
pub use redis::RedisError;
