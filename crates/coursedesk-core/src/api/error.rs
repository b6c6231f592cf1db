use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::SessionError;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-2xx status. Display is the resolved
    /// message alone so callers can show it as-is.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Missing path parameter `{name}` for {path}")]
    MissingPathParam { name: String, path: &'static str },

    #[error("Payload mismatch for {action}: expected {expected}, got {actual}")]
    PayloadMismatch {
        action: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Maximum length for response bodies embedded in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<serde_json::Value>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Build the protocol error for a non-2xx response.
    ///
    /// The message comes from the body's `message` field when the body is JSON
    /// and the field is a non-empty string, otherwise `Error: <status>`.
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| match b.message {
                Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
                _ => None,
            })
            .unwrap_or_else(|| format!("Error: {}", status.as_u16()));

        ApiError::Status { status, message }
    }

    /// HTTP status of a protocol failure
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
