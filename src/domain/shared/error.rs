use reqwest::StatusCode;

/// Errors surfaced to code calling the patients API through the SDK
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The refresh token is missing, expired or rejected; a new login is needed
    #[error("session expired")]
    SessionExpired,

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: StatusCode, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("token storage error: {0}")]
    Storage(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// HTTP status carried by the error, when there is one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::ResourceNotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
