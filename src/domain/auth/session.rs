use reqwest::{StatusCode, Url};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{Credentials, RefreshTokenRequest, RefreshTokenResponse, TokenPair, TokenStore};
use crate::domain::client::endpoint;
use crate::domain::shared::{ApiErrorBody, ClientError, ClientResult};

pub const LOGIN_PATH: &str = "/api/login/";
pub const REGISTER_PATH: &str = "/api/register/";
pub const REFRESH_PATH: &str = "/api/token/refresh/";

/// Holds the access/refresh token pair for one API user.
///
/// Refreshes run under a lock scoped to the session, so concurrent callers
/// that all saw a `401` for the same access token trigger one refresh call.
pub struct Session {
    http: reqwest::Client,
    base_url: Url,
    store: Arc<dyn TokenStore>,
    refresh_lock: Mutex<()>,
}

impl Session {
    pub fn new(http: reqwest::Client, base_url: Url, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            base_url,
            store,
            refresh_lock: Mutex::new(()),
        }
    }

    /// POST /api/login/ and persist the issued pair
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<TokenPair> {
        tracing::debug!(username = %credentials.username, "Logging in");
        self.obtain_tokens(LOGIN_PATH, credentials).await
    }

    /// POST /api/register/ - creates the account and starts a session for it
    pub async fn register(&self, credentials: &Credentials) -> ClientResult<TokenPair> {
        tracing::debug!(username = %credentials.username, "Registering user");
        self.obtain_tokens(REGISTER_PATH, credentials).await
    }

    /// Current access token, `None` before login or after logout
    pub async fn access_token(&self) -> ClientResult<Option<String>> {
        Ok(self.store.load().await?.map(|tokens| tokens.access))
    }

    pub async fn is_authenticated(&self) -> ClientResult<bool> {
        Ok(self.store.load().await?.is_some())
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Only the access token is replaced. Any rejection by the issuer leaves
    /// the stored pair untouched and yields [`ClientError::SessionExpired`].
    pub async fn refresh(&self) -> ClientResult<()> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Refresh after the API rejected `rejected`, unless a concurrent caller
    /// already replaced that token while this one waited for the lock.
    pub(crate) async fn refresh_after_rejection(&self, rejected: Option<&str>) -> ClientResult<()> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.access_token().await? {
            if Some(current.as_str()) != rejected {
                tracing::debug!("Access token already refreshed by a concurrent request");
                return Ok(());
            }
        }

        self.refresh_locked().await
    }

    /// Forget both tokens. Safe to call any number of times.
    pub async fn logout(&self) -> ClientResult<()> {
        // wait for an in-flight refresh so it cannot write the pair back
        let _guard = self.refresh_lock.lock().await;
        self.store.clear().await?;
        tracing::debug!("Session cleared");
        Ok(())
    }

    async fn refresh_locked(&self) -> ClientResult<()> {
        let Some(mut tokens) = self.store.load().await? else {
            tracing::debug!("No refresh token stored");
            return Err(ClientError::SessionExpired);
        };

        let response = self
            .http
            .post(endpoint(&self.base_url, REFRESH_PATH)?)
            .json(&RefreshTokenRequest {
                refresh: tokens.refresh.clone(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.bytes().await {
                Ok(bytes) => ApiErrorBody::parse(&bytes),
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to read refresh rejection body");
                    ApiErrorBody::default()
                }
            };
            tracing::warn!(
                status = %status.as_u16(),
                reason = body.summary().unwrap_or("unknown"),
                "Refresh token rejected"
            );
            return Err(ClientError::SessionExpired);
        }

        let refreshed: RefreshTokenResponse = serde_json::from_slice(&response.bytes().await?)?;
        tokens.access = refreshed.access;
        self.store.save(&tokens).await?;

        tracing::debug!("Access token refreshed");
        Ok(())
    }

    async fn obtain_tokens(&self, path: &str, credentials: &Credentials) -> ClientResult<TokenPair> {
        let response = self
            .http
            .post(endpoint(&self.base_url, path)?)
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = ApiErrorBody::parse(&bytes);
            let reason = body
                .summary()
                .map(str::to_string)
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClientError::AuthenticationFailed(reason));
        }

        if !status.is_success() {
            return Err(ClientError::RequestFailed {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let tokens: TokenPair = serde_json::from_slice(&bytes)?;
        self.store.save(&tokens).await?;
        Ok(tokens)
    }
}
