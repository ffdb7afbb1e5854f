use axum::{
    body::to_bytes,
    extract::{ConnectInfo, Request, State},
    response::Response,
};
use http_body_util::LengthLimitError;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{AppError, AppResult},
    infrastructure::http::RequestId,
    infrastructure::proxy::{apply_forwarding_headers, strip_hop_by_hop, UpstreamClient},
};

pub struct ProxyController {
    upstream: Arc<UpstreamClient>,
    client_body_timeout: Duration,
}

impl ProxyController {
    pub fn new(upstream: Arc<UpstreamClient>, client_body_timeout: Duration) -> Self {
        Self {
            upstream,
            client_body_timeout,
        }
    }

    /// ANY /api/* - forwarded to the application server
    pub async fn forward_api(
        State(controller): State<Arc<ProxyController>>,
        request: Request,
    ) -> AppResult<Response> {
        controller.forward("api", request).await
    }

    /// Everything no other route claims
    pub async fn forward_default(
        State(controller): State<Arc<ProxyController>>,
        request: Request,
    ) -> AppResult<Response> {
        controller.forward("default", request).await
    }

    async fn forward(&self, route: &'static str, request: Request) -> AppResult<Response> {
        let client_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|RequestId(id)| id.clone())
            .unwrap_or_default();

        let (parts, body) = request.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        // the body is already capped by the limit layer
        let body = match tokio::time::timeout(self.client_body_timeout, to_bytes(body, usize::MAX)).await {
            Err(_) => {
                return Err(AppError::RequestTimeout(format!(
                    "body not received within {:?}",
                    self.client_body_timeout
                )))
            }
            Ok(Err(e)) if exceeded_length_limit(&e) => {
                return Err(AppError::PayloadTooLarge(e.to_string()))
            }
            Ok(Err(e)) => {
                return Err(AppError::BadRequest(format!("Failed to read request body: {}", e)))
            }
            Ok(Ok(bytes)) => bytes,
        };

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        apply_forwarding_headers(&mut headers, client_ip, "http");

        tracing::debug!(
            route,
            request_id = %request_id,
            method = %parts.method,
            path = %path_and_query,
            client_ip = ?client_ip,
            "Forwarding request upstream"
        );

        self.upstream
            .forward(parts.method, &path_and_query, headers, body)
            .await
    }
}

fn exceeded_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
