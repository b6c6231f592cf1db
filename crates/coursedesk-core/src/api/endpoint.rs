//! Static descriptions of API operations.

use reqwest::Method;

/// How the request body is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    None,
    Json,
    Multipart,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::None => "none",
            PayloadKind::Json => "json",
            PayloadKind::Multipart => "multipart",
        }
    }
}

/// How a successful response body is returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    Binary,
}

/// One API operation: method, path template, auth requirement and body shapes.
///
/// `path` may contain `{name}` placeholders filled from the call's path
/// arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Human label for diagnostics, e.g. "fetch category"
    pub action: &'static str,
    pub method: Method,
    pub path: &'static str,
    pub requires_auth: bool,
    pub payload: PayloadKind,
    pub response: ResponseKind,
    /// Appends `page=<n>` (default 1) to the query string
    pub paginated: bool,
    /// Value for the `Accept` header, if the endpoint needs one
    pub accept: Option<&'static str>,
}

impl Endpoint {
    /// JSON-in, JSON-out endpoint requiring authentication
    pub const fn json(action: &'static str, method: Method, path: &'static str) -> Self {
        Self {
            action,
            method,
            path,
            requires_auth: true,
            payload: PayloadKind::Json,
            response: ResponseKind::Json,
            paginated: false,
            accept: None,
        }
    }

    /// Bodiless endpoint requiring authentication
    pub const fn bodiless(action: &'static str, method: Method, path: &'static str) -> Self {
        let mut endpoint = Self::json(action, method, path);
        endpoint.payload = PayloadKind::None;
        endpoint
    }

    pub const fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    pub const fn paginated(mut self) -> Self {
        self.paginated = true;
        self
    }

    pub const fn binary(mut self, accept: &'static str) -> Self {
        self.response = ResponseKind::Binary;
        self.accept = Some(accept);
        self
    }

    /// Return the 2xx body as raw bytes without an `Accept` header
    pub const fn raw(mut self) -> Self {
        self.response = ResponseKind::Binary;
        self
    }

    pub const fn with_payload(mut self, payload: PayloadKind) -> Self {
        self.payload = payload;
        self
    }

    /// Substitute `{name}` placeholders and split the path into segments.
    ///
    /// Segments are returned unencoded; the caller percent-encodes them when
    /// joining onto the base URL.
    pub fn segments<'a>(
        &self,
        params: &'a [(&'a str, String)],
    ) -> Result<Vec<&'a str>, String> {
        self.path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => params
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| value.as_str())
                    .ok_or_else(|| name.to_string()),
                None => Ok(segment),
            })
            .collect()
    }
}
