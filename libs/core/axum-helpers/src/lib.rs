//! # Axum Helpers
//!
//! Shared HTTP plumbing for the leads services.
//!
//! ## Modules
//!
//! - **[`auth`]**: bearer-token issuance and verification, typed [`Principal`], auth middleware
//! - **[`server`]**: server bootstrap with graceful shutdown, CORS, health reporting
//! - **[`errors`]**: the JSON error body every endpoint returns
//! - **[`extractors`]**: validated JSON bodies
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum_helpers::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use axum_helpers::server::create_production_app;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//! let protected = Router::new()
//!     .route("/leads", get(list_leads))
//!     .layer(axum::middleware::from_fn_with_state(auth.clone(), jwt_auth_middleware));
//!
//! create_production_app(protected, &server_config, Duration::from_secs(30), async {}).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod server;

pub use auth::{AuthError, Claims, JwtAuth, JwtConfig, Principal, Role, jwt_auth_middleware};
pub use errors::ErrorResponse;
pub use extractors::ValidatedJson;
pub use server::{
    ComponentStatus, HealthReport, ShutdownCoordinator, build_cors_layer, create_production_app,
    shutdown_signal,
};
