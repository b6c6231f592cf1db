//! Request building: headers and body for one endpoint call.
//!
//! The builder never touches the network. It turns an [`Endpoint`], a
//! [`Payload`] and the session's current token into a [`PreparedRequest`]
//! that a [`Transport`](super::transport::Transport) can send.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::debug;

use super::endpoint::{Endpoint, PayloadKind};
use super::ApiError;

/// Field name the server expects for spreadsheet imports
pub const IMPORT_FILE_FIELD: &str = "file";

/// Body supplied by the caller of an endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    None,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

impl Payload {
    /// Serialize any value into a JSON payload
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Payload::Json)
            .map_err(ApiError::Serialize)
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::None => PayloadKind::None,
            Payload::Json(_) => PayloadKind::Json,
            Payload::Multipart(_) => PayloadKind::Multipart,
        }
    }
}

/// A file attached to a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk, keeping its base name
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File(FilePart),
}

/// Ordered multipart form. Kept transport-neutral so it can be inspected
/// before being turned into a `reqwest::multipart::Form`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub parts: Vec<(String, PartValue)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), PartValue::Text(value.into())));
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: FilePart) -> Self {
        self.parts.push((name.into(), PartValue::File(file)));
        self
    }

    pub fn get(&self, name: &str) -> Option<&PartValue> {
        self.parts.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Body as it goes over the wire
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Vec<u8>),
    Multipart(MultipartForm),
}

#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

/// Build headers and body for `endpoint`.
///
/// Auth-required endpoints always carry `Authorization: Bearer <token>`; with
/// no token the value is `Bearer ` and the server is left to reject it.
pub fn build(
    endpoint: &Endpoint,
    payload: Payload,
    token: Option<&str>,
) -> Result<PreparedRequest, ApiError> {
    if payload.kind() != endpoint.payload {
        return Err(ApiError::PayloadMismatch {
            action: endpoint.action,
            expected: endpoint.payload.as_str(),
            actual: payload.kind().as_str(),
        });
    }

    let mut headers = HeaderMap::new();

    if endpoint.requires_auth {
        if token.is_none() {
            debug!(action = endpoint.action, "No session token, sending empty bearer");
        }
        let value = format!("Bearer {}", token.unwrap_or_default());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&value)
                .map_err(|_| ApiError::InvalidHeader("Authorization".to_string()))?,
        );
    }

    if let Some(accept) = endpoint.accept {
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
    }

    let body = match payload {
        Payload::None => None,
        Payload::Json(value) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            let bytes = serde_json::to_vec(&value).map_err(ApiError::Serialize)?;
            Some(RequestBody::Json(bytes))
        }
        // Content-Type with the boundary is set by the transport
        Payload::Multipart(form) => Some(RequestBody::Multipart(form)),
    };

    Ok(PreparedRequest { headers, body })
}
