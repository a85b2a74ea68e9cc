use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use utoipa::ToSchema;

/// State of one dependency as reported by `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Connected,
    Disconnected,
    Running,
    Stopped,
}

impl ComponentStatus {
    pub fn connected(up: bool) -> Self {
        if up { Self::Connected } else { Self::Disconnected }
    }

    pub fn running(up: bool) -> Self {
        if up { Self::Running } else { Self::Stopped }
    }

    pub fn is_up(self) -> bool {
        matches!(self, Self::Connected | Self::Running)
    }
}

/// `/health` body: `healthy` only when every component is up
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub status: String,
    pub services: BTreeMap<String, ComponentStatus>,
    pub version: String,
}

impl HealthReport {
    pub fn new(version: impl Into<String>, services: BTreeMap<String, ComponentStatus>) -> Self {
        let healthy = services.values().all(|s| s.is_up());
        Self {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            services,
            version: version.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Always 200: a degraded service is still serving requests.
impl IntoResponse for HealthReport {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A boxed connectivity probe
pub type HealthCheckFuture<'a> = Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>>;

/// Run probes concurrently, each bounded by `timeout`, and map them to
/// `connected`/`disconnected`.
pub async fn run_health_checks(
    checks: Vec<(&str, HealthCheckFuture<'_>)>,
    timeout: Duration,
) -> BTreeMap<String, ComponentStatus> {
    let names: Vec<String> = checks.iter().map(|(name, _)| name.to_string()).collect();
    let probes = checks
        .into_iter()
        .map(|(_, check)| tokio::time::timeout(timeout, check));
    let results = join_all(probes).await;

    names
        .into_iter()
        .zip(results)
        .map(|(name, result)| {
            let up = match result {
                Ok(Ok(())) => true,
                Ok(Err(e)) => {
                    tracing::warn!(component = %name, error = %e, "Health check failed");
                    false
                }
                Err(_) => {
                    tracing::warn!(component = %name, "Health check timed out");
                    false
                }
            };
            (name, ComponentStatus::connected(up))
        })
        .collect()
}
