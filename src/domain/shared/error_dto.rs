use serde::{Deserialize, Serialize};

/// Code the token verifier puts in the body of a `401` for a rejected access token
pub const TOKEN_NOT_VALID: &str = "token_not_valid";

/// Error body returned by the patients API.
///
/// The API is not consistent about the field it uses: the token verifier
/// answers with `detail`/`code`, resource views with `error` or `message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Parse a response body, falling back to an empty body for non-JSON payloads
    pub fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    pub fn is_token_not_valid(&self) -> bool {
        self.code.as_deref() == Some(TOKEN_NOT_VALID)
    }

    /// Human readable summary, if the body carried one
    pub fn summary(&self) -> Option<&str> {
        self.detail
            .as_deref()
            .or(self.error.as_deref())
            .or(self.message.as_deref())
    }
}
