use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{
    ApiClient, ApiError, CallArgs, Endpoint, FilePart, MultipartForm, Payload, PayloadKind,
    IMPORT_FILE_FIELD,
};
use crate::models::{Course, MessageResponse, Paginated, ResourceId};

/// MIME type requested from the export endpoint
pub const SPREADSHEET_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const LIST: Endpoint = Endpoint::bodiless("fetch courses", Method::GET, "/courses").paginated();
pub const GET: Endpoint = Endpoint::bodiless("fetch course", Method::GET, "/courses/{id}");
pub const CREATE: Endpoint = Endpoint::json("create course", Method::POST, "/courses");
pub const UPDATE: Endpoint = Endpoint::json("update course", Method::PUT, "/courses/{id}");
pub const DELETE: Endpoint = Endpoint::bodiless("delete course", Method::DELETE, "/courses/{id}");
pub const EXPORT: Endpoint =
    Endpoint::bodiless("export courses", Method::GET, "/courses/export").binary(SPREADSHEET_MIME);
pub const IMPORT: Endpoint = Endpoint::json("import courses", Method::POST, "/courses/import")
    .with_payload(PayloadKind::Multipart);

/// Body for course create/update: a JSON document, or a multipart form when
/// a file (cover image, attachment) goes along with the fields.
#[derive(Debug, Clone, PartialEq)]
pub enum CoursePayload {
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

impl CoursePayload {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(CoursePayload::Json)
            .map_err(ApiError::Serialize)
    }

    /// Endpoint variant matching this payload's encoding
    fn endpoint(&self, base: Endpoint) -> Endpoint {
        match self {
            CoursePayload::Json(_) => base,
            CoursePayload::Multipart(_) => base.with_payload(PayloadKind::Multipart),
        }
    }

    fn into_payload(self) -> Payload {
        match self {
            CoursePayload::Json(value) => Payload::Json(value),
            CoursePayload::Multipart(form) => Payload::Multipart(form),
        }
    }
}

impl From<MultipartForm> for CoursePayload {
    fn from(form: MultipartForm) -> Self {
        CoursePayload::Multipart(form)
    }
}

/// Course CRUD plus spreadsheet export/import. Every endpoint requires a
/// session token.
#[derive(Clone)]
pub struct CourseApi {
    client: ApiClient,
}

impl CourseApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch one page of courses (page 1 when `None`)
    pub async fn list(&self, page: Option<u32>) -> Result<Paginated<Course>, ApiError> {
        self.list_as(page).await
    }

    pub async fn list_as<T: DeserializeOwned>(&self, page: Option<u32>) -> Result<T, ApiError> {
        self.client.call_json(&LIST, CallArgs::new().page(page)).await
    }

    pub async fn get(&self, id: &ResourceId) -> Result<Course, ApiError> {
        self.get_as(id).await
    }

    pub async fn get_as<T: DeserializeOwned>(&self, id: &ResourceId) -> Result<T, ApiError> {
        self.client.call_json(&GET, CallArgs::new().param("id", id)).await
    }

    pub async fn create(&self, payload: impl Into<CoursePayload>) -> Result<Course, ApiError> {
        self.create_as(payload).await
    }

    pub async fn create_as<T: DeserializeOwned>(
        &self,
        payload: impl Into<CoursePayload>,
    ) -> Result<T, ApiError> {
        let payload = payload.into();
        let endpoint = payload.endpoint(CREATE);
        let args = CallArgs::new().payload(payload.into_payload());
        self.client.call_json(&endpoint, args).await
    }

    pub async fn update(
        &self,
        id: &ResourceId,
        payload: impl Into<CoursePayload>,
    ) -> Result<Course, ApiError> {
        self.update_as(id, payload).await
    }

    pub async fn update_as<T: DeserializeOwned>(
        &self,
        id: &ResourceId,
        payload: impl Into<CoursePayload>,
    ) -> Result<T, ApiError> {
        let payload = payload.into();
        let endpoint = payload.endpoint(UPDATE);
        let args = CallArgs::new()
            .param("id", id)
            .payload(payload.into_payload());
        self.client.call_json(&endpoint, args).await
    }

    /// Delete a course. An empty acknowledgement (204) gives a default response.
    pub async fn delete(&self, id: &ResourceId) -> Result<MessageResponse, ApiError> {
        let ack: Option<MessageResponse> = self.delete_as(id).await?;
        Ok(ack.unwrap_or_default())
    }

    pub async fn delete_as<T: DeserializeOwned>(&self, id: &ResourceId) -> Result<T, ApiError> {
        self.client.call_json(&DELETE, CallArgs::new().param("id", id)).await
    }

    /// Download all courses as a spreadsheet
    pub async fn export(&self) -> Result<Vec<u8>, ApiError> {
        self.client.call_binary(&EXPORT, CallArgs::new()).await
    }

    /// Upload a spreadsheet of courses under the `file` form field
    pub async fn import(&self, file: FilePart) -> Result<MessageResponse, ApiError> {
        self.import_as(file).await
    }

    pub async fn import_as<T: DeserializeOwned>(&self, file: FilePart) -> Result<T, ApiError> {
        let form = MultipartForm::new().file(IMPORT_FILE_FIELD, file);
        let args = CallArgs::new().payload(Payload::Multipart(form));
        self.client.call_json(&IMPORT, args).await
    }
}
