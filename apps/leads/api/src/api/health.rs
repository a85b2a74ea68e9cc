//! `/health` with live probes of postgres, object storage and the broker.

use crate::state::AppState;
use axum::extract::State;
use axum_helpers::server::{HealthCheckFuture, HealthReport, run_health_checks};
use domain_leads::ResumeStorage;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

pub async fn health(State(state): State<AppState>) -> HealthReport {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![
        (
            "postgres",
            Box::pin(async {
                database::postgres::check_health(&state.db)
                    .await
                    .map_err(|e| e.to_string())
            }),
        ),
        (
            "storage",
            Box::pin(async { state.storage.health_check().await.map_err(|e| e.to_string()) }),
        ),
        (
            "broker",
            Box::pin(async {
                if state.producer.health_check().await {
                    Ok(())
                } else {
                    Err("producer not connected".to_string())
                }
            }),
        ),
    ];

    let services = run_health_checks(checks, PROBE_TIMEOUT).await;
    HealthReport::new(state.config.app.version, services)
}
