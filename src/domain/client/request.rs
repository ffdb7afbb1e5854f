use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::shared::{ApiErrorBody, ClientError, ClientResult};

/// A request that can be issued more than once, so a rejected call can be
/// replayed after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post<T: Serialize + ?Sized>(path: impl Into<String>, body: &T) -> ClientResult<Self> {
        Self::new(Method::POST, path).with_json(body)
    }

    pub fn put<T: Serialize + ?Sized>(path: impl Into<String>, body: &T) -> ClientResult<Self> {
        Self::new(Method::PUT, path).with_json(body)
    }

    pub fn patch<T: Serialize + ?Sized>(path: impl Into<String>, body: &T) -> ClientResult<Self> {
        Self::new(Method::PATCH, path).with_json(body)
    }

    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter only when a value is present
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// Fully buffered API response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn error_body(&self) -> ApiErrorBody {
        ApiErrorBody::parse(&self.body)
    }

    /// Turn a non-2xx response into the matching [`ClientError`]
    pub fn error_for_status(self, path: &str) -> ClientResult<Self> {
        if self.status.is_success() {
            return Ok(self);
        }

        if self.status == StatusCode::NOT_FOUND {
            let reason = self
                .error_body()
                .summary()
                .map(|s| format!("{} ({})", path, s))
                .unwrap_or_else(|| path.to_string());
            return Err(ClientError::ResourceNotFound(reason));
        }

        Err(ClientError::RequestFailed {
            status: self.status,
            body: self.text(),
        })
    }
}
