use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{ApiClient, ApiError, CallArgs, Endpoint, Payload};
use crate::models::{Category, CategoryInput, MessageResponse, Paginated, ResourceId};

pub const LIST: Endpoint =
    Endpoint::bodiless("fetch categories", Method::GET, "/categories").paginated();
pub const GET: Endpoint = Endpoint::bodiless("fetch category", Method::GET, "/categories/{id}");
pub const CREATE: Endpoint = Endpoint::json("create category", Method::POST, "/categories");
pub const UPDATE: Endpoint = Endpoint::json("update category", Method::PUT, "/categories/{id}");
pub const DELETE: Endpoint =
    Endpoint::bodiless("delete category", Method::DELETE, "/categories/{id}");

/// Category CRUD. Every endpoint requires a session token.
#[derive(Clone)]
pub struct CategoryApi {
    client: ApiClient,
}

impl CategoryApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch one page of categories (page 1 when `None`)
    pub async fn list(&self, page: Option<u32>) -> Result<Paginated<Category>, ApiError> {
        self.list_as(page).await
    }

    pub async fn list_as<T: DeserializeOwned>(&self, page: Option<u32>) -> Result<T, ApiError> {
        self.client.call_json(&LIST, CallArgs::new().page(page)).await
    }

    pub async fn get(&self, id: &ResourceId) -> Result<Category, ApiError> {
        self.get_as(id).await
    }

    pub async fn get_as<T: DeserializeOwned>(&self, id: &ResourceId) -> Result<T, ApiError> {
        self.client.call_json(&GET, CallArgs::new().param("id", id)).await
    }

    pub async fn create(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        self.create_as(input).await
    }

    pub async fn create_as<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        input: &B,
    ) -> Result<T, ApiError> {
        let args = CallArgs::new().payload(Payload::json(input)?);
        self.client.call_json(&CREATE, args).await
    }

    pub async fn update(&self, id: &ResourceId, input: &CategoryInput) -> Result<Category, ApiError> {
        self.update_as(id, input).await
    }

    pub async fn update_as<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        id: &ResourceId,
        input: &B,
    ) -> Result<T, ApiError> {
        let args = CallArgs::new()
            .param("id", id)
            .payload(Payload::json(input)?);
        self.client.call_json(&UPDATE, args).await
    }

    /// Delete a category. An empty acknowledgement (204) gives a default response.
    pub async fn delete(&self, id: &ResourceId) -> Result<MessageResponse, ApiError> {
        let ack: Option<MessageResponse> = self.delete_as(id).await?;
        Ok(ack.unwrap_or_default())
    }

    pub async fn delete_as<T: DeserializeOwned>(&self, id: &ResourceId) -> Result<T, ApiError> {
        self.client.call_json(&DELETE, CallArgs::new().param("id", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::{client_with, header, FakeTransport};
    use crate::auth::Session;
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<FakeTransport>, CategoryApi) {
        let fake = Arc::new(FakeTransport::default());
        let session = Session::in_memory();
        session.set_token("cat-token").unwrap();
        let api = CategoryApi::new(client_with(&fake, session));
        (fake, api)
    }

    #[tokio::test]
    async fn test_list_pages() {
        let (fake, api) = setup();
        let page = json!({"data": [{"id": 1, "name": "Web"}], "current_page": 1, "last_page": 2});
        fake.respond_json(200, page.clone()).respond_json(200, page);

        let first = api.list(None).await.unwrap();
        assert_eq!(first.data[0].name, "Web");
        assert!(first.has_next());
        assert_eq!(fake.last().url.query(), Some("page=1"));

        api.list(Some(3)).await.unwrap();
        let req = fake.last();
        assert_eq!(req.url.query(), Some("page=3"));
        assert_eq!(header(&req, AUTHORIZATION).as_deref(), Some("Bearer cat-token"));
    }

    #[tokio::test]
    async fn test_get_and_delete_paths() {
        let (fake, api) = setup();
        fake.respond_json(200, json!({"id": 5, "name": "Data"}))
            .respond_json(200, json!({"message": "Category deleted"}));

        let category = api.get(&ResourceId::Int(5)).await.unwrap();
        assert_eq!(category.name, "Data");
        assert_eq!(fake.last().url.path(), "/categories/5");

        let resp = api.delete(&ResourceId::Int(5)).await.unwrap();
        assert_eq!(resp.message.as_deref(), Some("Category deleted"));
        let req = fake.last();
        assert_eq!(req.method, Method::DELETE);
        assert!(req.body.is_none());
    }

    #[tokio::test]
    async fn test_create_and_update_send_json() {
        let (fake, api) = setup();
        fake.respond_json(201, json!({"id": 9, "name": "Ops"}))
            .respond_json(200, json!({"id": 9, "name": "DevOps"}));

        api.create(&CategoryInput::new("Ops")).await.unwrap();
        let req = fake.last();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url.path(), "/categories");
        assert_eq!(header(&req, CONTENT_TYPE).as_deref(), Some("application/json"));

        let updated = api
            .update(&ResourceId::Int(9), &CategoryInput::new("DevOps"))
            .await
            .unwrap();
        assert_eq!(updated.name, "DevOps");
        let req = fake.last();
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.url.path(), "/categories/9");
    }

    #[tokio::test]
    async fn test_delete_with_no_content() {
        let (fake, api) = setup();
        fake.respond(204, "");

        let resp = api.delete(&ResourceId::Int(7)).await.unwrap();
        assert_eq!(resp, MessageResponse::default());
        assert_eq!(fake.last().url.path(), "/categories/7");
    }

    #[tokio::test]
    async fn test_validation_error_message() {
        let (fake, api) = setup();
        fake.respond_json(422, json!({"message": "The name field is required."}));

        let err = api.create(&CategoryInput::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "The name field is required.");
    }
}
