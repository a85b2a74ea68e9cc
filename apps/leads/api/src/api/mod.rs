use axum::Router;
use axum::routing::get;
use axum_helpers::JwtAuth;
use domain_users::{PgUserRepository, UserService};

use crate::state::{AppState, Leads};

pub mod health;

/// Versioned API: lead routes plus `/auth`, without shared layers.
pub fn routes(leads: Leads, users: UserService<PgUserRepository>, auth: JwtAuth) -> Router {
    Router::new()
        .merge(domain_leads::handlers::router(leads, auth))
        .nest("/auth", domain_users::handlers::router(users))
}

/// `/health`, carrying its own state so it merges into the stateless app router.
pub fn health_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .with_state(state)
}
