use axum::Router;
use axum::routing::get;

use crate::state::AppState;

pub mod health;

/// `/` service identification and `/health`
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .with_state(state)
}
