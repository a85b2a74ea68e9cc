//! Server infrastructure: bootstrap with graceful shutdown, CORS, health reporting.

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{build_cors_layer, create_production_app, with_common_layers};
pub use health::{ComponentStatus, HealthCheckFuture, HealthReport, run_health_checks};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
