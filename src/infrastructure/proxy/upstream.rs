use axum::body::Body;
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use bytes::{Bytes, BytesMut};
use reqwest::Url;
use std::time::Duration;

use super::headers::strip_hop_by_hop;
use crate::error::{AppError, AppResult};
use crate::infrastructure::config::Config;

/// The application server behind the proxy
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
    send_timeout: Duration,
    read_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build upstream client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.upstream_url.clone(),
            send_timeout: config.send_timeout(),
            read_timeout: config.read_timeout(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Upstream URL for an incoming path and query, kept verbatim
    pub fn url_for(&self, path_and_query: &str) -> AppResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}{}", base, path_and_query))
            .map_err(|e| AppError::BadRequest(format!("Cannot forward {}: {}", path_and_query, e)))
    }

    /// Send a request upstream and buffer its response.
    ///
    /// The send timeout covers transmitting the request and receiving the
    /// response head. The read timeout bounds the gap between body chunks.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> AppResult<Response> {
        let url = self.url_for(path_and_query)?;
        let pending = self
            .http
            .request(method, url)
            .headers(headers)
            .body(body)
            .send();

        let upstream = match tokio::time::timeout(self.send_timeout, pending).await {
            Err(_) => {
                return Err(AppError::GatewayTimeout(format!(
                    "no response within {:?}",
                    self.send_timeout
                )))
            }
            Ok(Err(e)) => return Err(classify(e)),
            Ok(Ok(response)) => response,
        };

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_by_hop(&mut headers);

        let body = self.read_body(upstream).await?;

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }

    /// GET `path` and report whether the upstream answered 2xx within `timeout`
    pub async fn probe(&self, path: &str, timeout: Duration) -> bool {
        let Ok(url) = self.url_for(path) else {
            return false;
        };

        match self.http.get(url).timeout(timeout).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Upstream probe failed");
                false
            }
        }
    }

    async fn read_body(&self, mut upstream: reqwest::Response) -> AppResult<Bytes> {
        let mut buf = BytesMut::new();
        loop {
            match tokio::time::timeout(self.read_timeout, upstream.chunk()).await {
                Err(_) => {
                    return Err(AppError::GatewayTimeout(format!(
                        "upstream body stalled for {:?}",
                        self.read_timeout
                    )))
                }
                Ok(Err(e)) => return Err(classify(e)),
                Ok(Ok(Some(chunk))) => buf.extend_from_slice(&chunk),
                Ok(Ok(None)) => return Ok(buf.freeze()),
            }
        }
    }
}

fn classify(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::GatewayTimeout(err.to_string())
    } else {
        AppError::BadGateway(err.to_string())
    }
}
