//! Connectors for the stores the leads pipeline talks to.
//!
//! - `postgres` (default): SeaORM connection pool, migrations, health check
//! - `redis` (default): `ConnectionManager` used as the event broker transport
//!
//! ```ignore
//! use database::{postgres, redis};
//!
//! let db = postgres::connect_with_retry(&db_url, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "leads_api").await?;
//!
//! let conn = redis::connect_with_retry("redis://127.0.0.1:6379", None).await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "redis")]
pub mod redis;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
