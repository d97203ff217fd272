//! HTTP client for the marketplace backend

use ecofind_core::{
    config::BackendConfig,
    types::{LoginRequest, LoginResponse, Product, ProductId, User, UsersEnvelope},
    Error, Result,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Header the backend uses to tell console logins from storefront logins
const FRONTEND_TYPE_HEADER: &str = "x-frontend-type";

/// Typed client for every backend call the console makes
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    frontend_type: String,
    timeout: Duration,
}

impl BackendClient {
    /// Client for the configured backend
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration {
                message: format!("Failed to build backend HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            frontend_type: config.frontend_type.clone(),
            timeout,
        })
    }

    /// Backend origin
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticate an administrator
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] for rejected credentials or a
    /// non-admin account, [`Error::Transport`] if the backend is unreachable.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
        let url = format!("{}/auth/login", self.base_url);
        debug!(email = %credentials.email, "Attempting admin login");

        let response = self
            .send(
                self.client
                    .post(&url)
                    .header(FRONTEND_TYPE_HEADER, &self.frontend_type)
                    .json(credentials),
            )
            .await?;

        if !response.status().is_success() {
            let (_, reason) = Self::failure_reason(response).await;
            warn!(email = %credentials.email, %reason, "Login rejected by backend");
            return Err(Error::Authentication(reason));
        }

        let login: LoginResponse = Self::decode(response).await?;
        if !login.user.is_admin() {
            warn!(email = %credentials.email, role = %login.user.role, "Non-admin login attempt");
            return Err(Error::Authentication(
                "Administrator account required".to_string(),
            ));
        }
        Ok(login)
    }

    /// List every user account
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not decode.
    pub async fn list_users(&self, token: &str) -> Result<Vec<User>> {
        let envelope: UsersEnvelope = self.get_json(token, "/users").await?;
        Ok(envelope.users)
    }

    /// Approve a user's identity documents
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses.
    pub async fn approve_user(&self, token: &str, user_id: &str) -> Result<()> {
        let path = format!("/users/{}/approve", urlencoding::encode(user_id));
        self.post_empty(token, &path).await
    }

    /// List every product
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not decode.
    pub async fn list_products(&self, token: &str) -> Result<Vec<Product>> {
        self.get_json(token, "/products").await
    }

    /// List products awaiting moderation
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not decode.
    pub async fn list_pending_products(&self, token: &str) -> Result<Vec<Product>> {
        self.get_json(token, "/products/pending").await
    }

    /// Approve a product listing
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses.
    pub async fn approve_product(&self, token: &str, product_id: ProductId) -> Result<()> {
        self.post_empty(token, &format!("/products/{product_id}/approve"))
            .await
    }

    /// Reject a product listing
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend refuses.
    pub async fn reject_product(&self, token: &str, product_id: ProductId) -> Result<()> {
        self.post_empty(token, &format!("/products/{product_id}/reject"))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self.send(self.client.get(&url).bearer_auth(token)).await?;
        let response = Self::ensure_success(response).await?;
        Self::decode(response).await
    }

    async fn post_empty(&self, token: &str, path: &str) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        let response = self.send(self.client.post(&url).bearer_auth(token)).await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    duration_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                }
            } else {
                Error::Transport(e.to_string())
            }
        })
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let (status, message) = Self::failure_reason(response).await;
        Err(Error::Backend { status, message })
    }

    /// Status plus the backend's `error` or `message` field, falling back to
    /// the status reason phrase
    async fn failure_reason(response: Response) -> (u16, String) {
        let status = response.status();
        let fallback = status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string();
        let reason = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                ["error", "message"]
                    .iter()
                    .find_map(|key| body.get(*key).and_then(|v| v.as_str()).map(str::to_string))
            })
            .unwrap_or(fallback);
        (status.as_u16(), reason)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::MalformedResponse(e.to_string()))
    }
}
