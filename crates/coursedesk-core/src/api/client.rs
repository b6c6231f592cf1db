//! API client shared by every resource client.
//!
//! `ApiClient::call` is the single place where a request is built, sent and
//! its response classified. Resource clients only describe endpoints and bind
//! arguments.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::endpoint::{Endpoint, ResponseKind};
use super::request::{self, Payload};
use super::transport::{HttpRequest, HttpTransport, Transport};
use super::ApiError;
use crate::auth::Session;

/// Arguments bound to one endpoint call
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    pub path_params: Vec<(&'static str, String)>,
    pub page: Option<u32>,
    pub payload: Payload,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.path_params.push((name, value.to_string()));
        self
    }

    pub fn page(mut self, page: Option<u32>) -> Self {
        self.page = page;
        self
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }
}

/// Decoded body of a successful call
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Binary(Vec<u8>),
}

/// API client for the course management backend.
/// Clone is cheap - transport and session are shared.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    session: Session,
}

impl ApiClient {
    /// Create a client using the reqwest transport
    pub fn new(base_url: &str, timeout: Duration, session: Session) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(timeout)?;
        Self::with_transport(base_url, Arc::new(transport), session)
    }

    /// Create a client over any transport
    pub fn with_transport(
        base_url: &str,
        transport: Arc<dyn Transport>,
        session: Session,
    ) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            transport,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve the endpoint's path and query against the base URL
    pub fn url_for(&self, endpoint: &Endpoint, args: &CallArgs) -> Result<Url, ApiError> {
        let segments = endpoint
            .segments(&args.path_params)
            .map_err(|name| ApiError::MissingPathParam {
                name,
                path: endpoint.path,
            })?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        if endpoint.paginated {
            url.query_pairs_mut()
                .append_pair("page", &args.page.unwrap_or(1).to_string());
        }
        Ok(url)
    }

    /// Call an endpoint and return the decoded body.
    ///
    /// Every failure is logged here, once, then returned.
    pub async fn call(&self, endpoint: &Endpoint, args: CallArgs) -> Result<ResponseBody, ApiError> {
        let result = self.dispatch(endpoint, args).await;
        if let Err(ref err) = result {
            warn!(
                action = endpoint.action,
                method = %endpoint.method,
                path = endpoint.path,
                status = err.status().map(|s| s.as_u16()),
                error = %err,
                "Failed to {}",
                endpoint.action
            );
        }
        result
    }

    /// Call a JSON endpoint and deserialize the body into `T`
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        args: CallArgs,
    ) -> Result<T, ApiError> {
        match self.call(endpoint, args).await? {
            ResponseBody::Json(value) => serde_json::from_value(value).map_err(|e| {
                let err = ApiError::Decode(format!("Unexpected shape for {}: {}", endpoint.action, e));
                warn!(action = endpoint.action, error = %err, "Failed to {}", endpoint.action);
                err
            }),
            ResponseBody::Binary(_) => Err(ApiError::Decode(format!(
                "{} returns binary data, not JSON",
                endpoint.action
            ))),
        }
    }

    /// Call a binary endpoint and return the raw bytes
    pub async fn call_binary(&self, endpoint: &Endpoint, args: CallArgs) -> Result<Vec<u8>, ApiError> {
        match self.call(endpoint, args).await? {
            ResponseBody::Binary(bytes) => Ok(bytes),
            ResponseBody::Json(_) => Err(ApiError::Decode(format!(
                "{} returns JSON, not binary data",
                endpoint.action
            ))),
        }
    }

    async fn dispatch(&self, endpoint: &Endpoint, args: CallArgs) -> Result<ResponseBody, ApiError> {
        let url = self.url_for(endpoint, &args)?;
        let token = self.session.token();
        let prepared = request::build(endpoint, args.payload, token.as_deref())?;

        debug!(action = endpoint.action, method = %endpoint.method, url = %url, "Sending request");

        let response = self
            .transport
            .send(HttpRequest {
                method: endpoint.method.clone(),
                url,
                headers: prepared.headers,
                body: prepared.body,
            })
            .await?;

        if !response.status.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }

        match endpoint.response {
            ResponseKind::Binary => Ok(ResponseBody::Binary(response.body)),
            ResponseKind::Json if response.body.iter().all(u8::is_ascii_whitespace) => {
                Ok(ResponseBody::Json(serde_json::Value::Null))
            }
            ResponseKind::Json => serde_json::from_slice(&response.body)
                .map(ResponseBody::Json)
                .map_err(|e| {
                    let body = String::from_utf8_lossy(&response.body);
                    ApiError::Decode(format!("{} ({})", e, ApiError::truncate_body(&body)))
                }),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::request::RequestBody;
    use crate::api::transport::HttpResponse;
    use async_trait::async_trait;
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
    use reqwest::{Method, StatusCode};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// In-process transport that records requests and replays canned responses
    #[derive(Default)]
    pub(crate) struct FakeTransport {
        pub requests: Mutex<Vec<HttpRequest>>,
        responses: Mutex<VecDeque<(StatusCode, Vec<u8>)>>,
    }

    impl FakeTransport {
        pub fn respond(&self, status: u16, body: impl Into<Vec<u8>>) -> &Self {
            self.responses
                .lock()
                .unwrap()
                .push_back((StatusCode::from_u16(status).unwrap(), body.into()));
            self
        }

        pub fn respond_json(&self, status: u16, body: serde_json::Value) -> &Self {
            self.respond(status, serde_json::to_vec(&body).unwrap())
        }

        pub fn last(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().expect("no request sent")
        }

        pub fn count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.lock().unwrap().push(request);
            let (status, body) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no canned response");
            Ok(HttpResponse { status, body })
        }
    }

    pub(crate) fn client_with(fake: &Arc<FakeTransport>, session: Session) -> ApiClient {
        ApiClient::with_transport("https://api.example.com", fake.clone(), session).unwrap()
    }

    pub(crate) fn header(req: &HttpRequest, name: reqwest::header::HeaderName) -> Option<String> {
        req.headers.get(name).map(|v| v.to_str().unwrap().to_string())
    }

    const LIST: Endpoint = Endpoint::bodiless("fetch things", Method::GET, "/things").paginated();
    const GET: Endpoint = Endpoint::bodiless("fetch thing", Method::GET, "/things/{id}");
    const EXPORT: Endpoint =
        Endpoint::bodiless("export things", Method::GET, "/things/export").binary("text/csv");

    #[tokio::test]
    async fn test_success_decodes_json() {
        let fake = Arc::new(FakeTransport::default());
        fake.respond_json(200, json!({"id": 7, "name": "Seven"}));
        let session = Session::in_memory();
        session.set_token("abc").unwrap();
        let client = client_with(&fake, session);

        let body = client.call(&GET, CallArgs::new().param("id", 7)).await.unwrap();
        assert_eq!(body, ResponseBody::Json(json!({"id": 7, "name": "Seven"})));

        let req = fake.last();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.as_str(), "https://api.example.com/things/7");
        assert_eq!(header(&req, AUTHORIZATION).as_deref(), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_404_uses_message() {
        let fake = Arc::new(FakeTransport::default());
        fake.respond_json(404, json!({"message": "Not found"}));
        let client = client_with(&fake, Session::in_memory());

        let err = client.call(&GET, CallArgs::new().param("id", 1)).await.unwrap_err();
        assert_eq!(err.to_string(), "Not found");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_500_non_json_falls_back_to_status() {
        let fake = Arc::new(FakeTransport::default());
        fake.respond(500, "Internal Server Error");
        let client = client_with(&fake, Session::in_memory());

        let err = client.call(&GET, CallArgs::new().param("id", 1)).await.unwrap_err();
        assert_eq!(err.to_string(), "Error: 500");
    }

    #[tokio::test]
    async fn test_invalid_json_on_success_is_decode_error() {
        let fake = Arc::new(FakeTransport::default());
        fake.respond(200, "<html>");
        let client = client_with(&fake, Session::in_memory());

        let err = client.call(&GET, CallArgs::new().param("id", 1)).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let fake = Arc::new(FakeTransport::default());
        fake.respond(204, "");
        let client = client_with(&fake, Session::in_memory());

        let body = client.call(&GET, CallArgs::new().param("id", 1)).await.unwrap();
        assert_eq!(body, ResponseBody::Json(serde_json::Value::Null));
    }

    #[tokio::test]
    async fn test_pagination_defaults_to_first_page() {
        let fake = Arc::new(FakeTransport::default());
        fake.respond_json(200, json!([])).respond_json(200, json!([]));
        let client = client_with(&fake, Session::in_memory());

        client.call(&LIST, CallArgs::new()).await.unwrap();
        assert_eq!(fake.last().url.as_str(), "https://api.example.com/things?page=1");

        client.call(&LIST, CallArgs::new().page(Some(3))).await.unwrap();
        assert_eq!(fake.last().url.as_str(), "https://api.example.com/things?page=3");
    }

    #[tokio::test]
    async fn test_binary_response() {
        let fake = Arc::new(FakeTransport::default());
        fake.respond(200, vec![0x50, 0x4b, 0x03, 0x04]);
        let client = client_with(&fake, Session::in_memory());

        let bytes = client.call_binary(&EXPORT, CallArgs::new()).await.unwrap();
        assert_eq!(bytes, vec![0x50, 0x4b, 0x03, 0x04]);
    }

    #[tokio::test]
    async fn test_missing_path_param_never_sends() {
        let fake = Arc::new(FakeTransport::default());
        let client = client_with(&fake, Session::in_memory());

        let err = client.call(&GET, CallArgs::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingPathParam { ref name, .. } if name == "id"));
        assert_eq!(fake.count(), 0);
    }

    #[tokio::test]
    async fn test_call_json_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        struct Thing {
            #[allow(dead_code)]
            id: i64,
        }

        let fake = Arc::new(FakeTransport::default());
        fake.respond_json(200, json!({"name": "no id"}));
        let client = client_with(&fake, Session::in_memory());

        let err = client
            .call_json::<Thing>(&GET, CallArgs::new().param("id", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_json_body_is_sent() {
        let create = Endpoint::json("create thing", Method::POST, "/things");
        let fake = Arc::new(FakeTransport::default());
        fake.respond_json(201, json!({"id": 1}));
        let client = client_with(&fake, Session::in_memory());

        client
            .call(&create, CallArgs::new().payload(Payload::Json(json!({"name": "x"}))))
            .await
            .unwrap();

        let req = fake.last();
        assert_eq!(header(&req, CONTENT_TYPE).as_deref(), Some("application/json"));
        assert_eq!(req.body, Some(RequestBody::Json(br#"{"name":"x"}"#.to_vec())));
    }

    #[test]
    fn test_url_for_encodes_segments_and_keeps_base_path() {
        let fake = Arc::new(FakeTransport::default());
        let client =
            ApiClient::with_transport("http://localhost:8000/api/", fake, Session::in_memory())
                .unwrap();
        let url = client
            .url_for(&GET, &CallArgs::new().param("id", "a b/c"))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/things/a%20b%2Fc");
    }

    #[test]
    fn test_invalid_base_url() {
        let fake = Arc::new(FakeTransport::default());
        assert!(matches!(
            ApiClient::with_transport("not a url", fake.clone(), Session::in_memory()),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::with_transport("mailto:someone@example.com", fake, Session::in_memory()),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
