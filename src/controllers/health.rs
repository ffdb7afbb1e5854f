use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::config::Config;
use crate::infrastructure::proxy::UpstreamClient;

/// GET /health - proxy liveness, never touches the upstream
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "healthy\n")
}

/// GET /health/ready - probes the upstream liveness endpoint
pub async fn health_ready(
    State((upstream, config)): State<(Arc<UpstreamClient>, Arc<Config>)>,
) -> impl IntoResponse {
    let policy = config.health_policy();
    if upstream.probe(&policy.path, policy.timeout).await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "upstream": "up"
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "upstream": "down"
            })),
        )
    }
}
