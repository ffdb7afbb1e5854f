use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::{endpoint, ApiRequest, ApiResponse, ClientConfig};
use crate::domain::auth::{Session, TokenStore};
use crate::domain::resources::{
    DoctorsApi, GivenMedicinesApi, MedicinesApi, PatientsApi, PrescribedMedicinesApi, RecordsApi,
    UsersApi,
};
use crate::domain::shared::ClientResult;

pub const HEALTH_PATH: &str = "/api/health/";

/// HTTP client for the patients API.
///
/// Every call goes through [`ApiClient::send`], which attaches the session's
/// access token and recovers from one expired token per call.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    /// Build a client with a fresh session backed by `store`
    pub fn new(config: &ClientConfig, store: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let http = config.build_http_client()?;
        let session = Arc::new(Session::new(http.clone(), config.base_url.clone(), store));
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session,
        })
    }

    /// Build a client that shares an existing session
    pub fn with_session(config: &ClientConfig, session: Arc<Session>) -> ClientResult<Self> {
        Ok(Self {
            http: config.build_http_client()?,
            base_url: config.base_url.clone(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Issue `request`, refreshing and retrying once if the access token is rejected.
    ///
    /// Any status other than `401` on the first attempt is returned unchanged.
    /// After a successful refresh the request is replayed exactly once and
    /// that response is returned whatever its status. A failed refresh
    /// surfaces as [`ClientError::SessionExpired`](crate::ClientError::SessionExpired).
    pub async fn send(&self, request: &ApiRequest) -> ClientResult<ApiResponse> {
        let token = self.session.access_token().await?;
        let response = self.execute(request, token.as_deref()).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!(
            method = %request.method(),
            path = request.path(),
            token_not_valid = response.error_body().is_token_not_valid(),
            "Access token rejected, refreshing"
        );
        self.session
            .refresh_after_rejection(token.as_deref())
            .await?;

        let token = self.session.access_token().await?;
        let retried = self.execute(request, token.as_deref()).await?;
        if retried.status == StatusCode::UNAUTHORIZED {
            tracing::warn!(
                method = %request.method(),
                path = request.path(),
                "Request rejected again after refresh"
            );
        }
        Ok(retried)
    }

    /// Send and decode a successful JSON body; non-2xx statuses become errors
    pub async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> ClientResult<T> {
        self.send(request)
            .await?
            .error_for_status(request.path())?
            .json()
    }

    /// Send and discard the body of a successful response
    pub async fn execute_ok(&self, request: &ApiRequest) -> ClientResult<()> {
        self.send(request).await?.error_for_status(request.path())?;
        Ok(())
    }

    /// GET /api/health/ - unauthenticated liveness probe of the API
    pub async fn health(&self) -> ClientResult<bool> {
        let response = self.execute(&ApiRequest::get(HEALTH_PATH), None).await?;
        Ok(response.is_success())
    }

    pub fn patients(&self) -> PatientsApi<'_> {
        PatientsApi::new(self)
    }

    pub fn doctors(&self) -> DoctorsApi<'_> {
        DoctorsApi::new(self)
    }

    pub fn medicines(&self) -> MedicinesApi<'_> {
        MedicinesApi::new(self)
    }

    pub fn records(&self) -> RecordsApi<'_> {
        RecordsApi::new(self)
    }

    pub fn prescribed_medicines(&self) -> PrescribedMedicinesApi<'_> {
        PrescribedMedicinesApi::new(self)
    }

    pub fn given_medicines(&self) -> GivenMedicinesApi<'_> {
        GivenMedicinesApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    async fn execute(&self, request: &ApiRequest, token: Option<&str>) -> ClientResult<ApiResponse> {
        let url = endpoint(&self.base_url, request.path())?;
        let mut builder = self.http.request(request.method().clone(), url);

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        tracing::trace!(
            method = %request.method(),
            path = request.path(),
            status = %status.as_u16(),
            "API call completed"
        );

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
