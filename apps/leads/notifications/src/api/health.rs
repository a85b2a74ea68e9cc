//! Identification and health endpoints for the consumer process.

use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum_helpers::server::{ComponentStatus, HealthReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: state.config.app.name,
        version: state.config.app.version,
        status: "running",
    })
}

pub async fn health(State(state): State<AppState>) -> HealthReport {
    let postgres_up = match &state.db {
        Some(db) => matches!(
            tokio::time::timeout(PROBE_TIMEOUT, database::postgres::check_health(db)).await,
            Ok(Ok(()))
        ),
        None => false,
    };
    let consumer_running = state.consumer.is_running().await;

    report(state.config.app.version, postgres_up, consumer_running)
}

fn report(version: &str, postgres_up: bool, consumer_running: bool) -> HealthReport {
    let mut services = BTreeMap::new();
    services.insert("postgres".to_string(), ComponentStatus::connected(postgres_up));
    services.insert("consumer".to_string(), ComponentStatus::running(consumer_running));
    HealthReport::new(version, services)
}
