use super::UpstreamClient;
use crate::error::{AppError, AppResult};
use crate::infrastructure::config::HealthPolicy;

/// Block until the upstream liveness endpoint answers, or the retry budget runs out.
///
/// Forwarding must not start against an upstream that never became healthy.
pub async fn wait_for_upstream(upstream: &UpstreamClient, policy: &HealthPolicy) -> AppResult<()> {
    for attempt in 1..=policy.retries {
        if upstream.probe(&policy.path, policy.timeout).await {
            tracing::info!(attempt, upstream = %upstream.base_url(), "Upstream is healthy");
            return Ok(());
        }

        tracing::warn!(
            attempt,
            retries = policy.retries,
            upstream = %upstream.base_url(),
            "Upstream health check failed"
        );

        if attempt < policy.retries {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(AppError::UpstreamUnavailable(format!(
        "{} not healthy after {} checks",
        upstream.base_url(),
        policy.retries
    )))
}
