use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, CallArgs, Endpoint, Payload};
use crate::models::{AuthResponse, Credentials, MessageResponse, Registration};

pub const LOGIN: Endpoint = Endpoint::json("login", Method::POST, "/login").public();
pub const REGISTER: Endpoint = Endpoint::json("register", Method::POST, "/register").public();
/// Any 2xx ends the session, whatever the body says
pub const LOGOUT: Endpoint = Endpoint::bodiless("logout", Method::POST, "/logout").raw();

/// Login, registration and logout.
///
/// The only resource client that writes the session: a token returned by
/// login or register is stored, and a successful logout clears it.
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in and store the returned token
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.login_as(credentials).await?;
        let Some(token) = response.token.as_deref() else {
            let err = ApiError::Decode("login response has no token".to_string());
            warn!(error = %err, "Failed to login");
            return Err(err);
        };
        self.store_token(token)?;
        info!(email = %credentials.email, "Logged in");
        Ok(response)
    }

    /// Log in without touching the session, decoding into `T`
    pub async fn login_as<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        credentials: &B,
    ) -> Result<T, ApiError> {
        let args = CallArgs::new().payload(Payload::json(credentials)?);
        self.client.call_json(&LOGIN, args).await
    }

    /// Register a user. A token in the response signs the user in.
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        let args = CallArgs::new().payload(Payload::json(registration)?);
        let response: AuthResponse = self.client.call_json(&REGISTER, args).await?;
        if let Some(token) = response.token.as_deref() {
            self.store_token(token)?;
        }
        Ok(response)
    }

    fn store_token(&self, token: &str) -> Result<(), ApiError> {
        self.client.session().set_token(token).map_err(|e| {
            warn!(error = %e, "Failed to store session token");
            ApiError::from(e)
        })
    }

    /// Log out and clear the stored token. A failed call keeps the token.
    pub async fn logout(&self) -> Result<MessageResponse, ApiError> {
        let body = self.client.call_binary(&LOGOUT, CallArgs::new()).await?;
        self.client.session().clear().map_err(|e| {
            warn!(error = %e, "Failed to clear session");
            ApiError::from(e)
        })?;
        info!("Logged out");
        Ok(logout_message(&body))
    }
}

/// Acknowledgement from a logout body; anything but a JSON object gives the default
fn logout_message(body: &[u8]) -> MessageResponse {
    if body.iter().all(u8::is_ascii_whitespace) {
        return MessageResponse::default();
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        let text = String::from_utf8_lossy(body);
        debug!(
            error = %e,
            body = %ApiError::truncate_body(&text),
            "Logout body is not a message"
        );
        MessageResponse::default()
    })
}
