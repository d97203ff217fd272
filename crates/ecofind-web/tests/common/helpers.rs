//! Test helper functions and utilities

use super::fixtures::{admin_login, TestConfigBuilder, ADMIN_TOKEN};
use axum::{
    body::Body,
    http::{header::AUTHORIZATION, HeaderValue, Method, Request, StatusCode},
    Router,
};
use ecofind_web::{build_app_with_state, AppState};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::{Arc, Once};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Console router wired to a mock backend
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub backend: MockServer,
    pub temp_dir: TempDir,
    console_token: Mutex<Option<String>>,
}

impl TestApp {
    /// App whose backend and lead endpoint are the same mock server
    pub async fn spawn() -> Self {
        Self::spawn_with(|builder| builder).await
    }

    /// App with extra configuration applied on top of the defaults
    pub async fn spawn_with(
        configure: impl FnOnce(TestConfigBuilder) -> TestConfigBuilder,
    ) -> Self {
        init_test_logging();
        let backend = MockServer::start().await;
        let builder = TestConfigBuilder::new()
            .with_backend(backend.uri())
            .with_lead_url(format!("{}/api/chatlead", backend.uri()));
        let (config, temp_dir) = configure(builder).build();

        let state = Arc::new(AppState::new(config).unwrap());
        let router = build_app_with_state(Arc::clone(&state));
        Self {
            router,
            state,
            backend,
            temp_dir,
            console_token: Mutex::new(None),
        }
    }

    /// Mock a successful admin login and log in through the console
    pub async fn login_admin(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(header("x-frontend-type", "admin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(admin_login()))
            .mount(&self.backend)
            .await;

        let (status, body) = self
            .post_json(
                "/api/auth/login",
                &serde_json::json!({"email": "admin-1@ecofind.test", "password": "secret"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        *self.console_token.lock() = Some(body["token"].as_str().unwrap().to_string());
    }

    /// Console token from the last successful `login_admin`
    pub fn console_token(&self) -> Option<String> {
        self.console_token.lock().clone()
    }

    /// Mock an authenticated backend GET
    pub async fn mock_get(&self, route: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("authorization", format!("Bearer {ADMIN_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.backend)
            .await;
    }

    /// Mock an authenticated backend POST answering `status`
    pub async fn mock_post(&self, route: &str, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(route))
            .and(header("authorization", format!("Bearer {ADMIN_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.backend)
            .await;
    }

    /// Send a request, presenting the console token when logged in
    pub async fn send(&self, mut request: Request<Body>) -> (StatusCode, Value) {
        if let Some(token) = self.console_token() {
            if !request.headers().contains_key(AUTHORIZATION) {
                let value = HeaderValue::from_str(&format!("Bearer {token}")).unwrap();
                request.headers_mut().insert(AUTHORIZATION, value);
            }
        }
        self.send_as_is(request).await
    }

    /// Send a request exactly as built and decode the JSON answer
    pub async fn send_as_is(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// GET `uri`
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(empty_request(Method::GET, uri)).await
    }

    /// POST `uri` without a body
    pub async fn post(&self, uri: &str) -> (StatusCode, Value) {
        self.send(empty_request(Method::POST, uri)).await
    }

    /// DELETE `uri`
    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(empty_request(Method::DELETE, uri)).await
    }

    /// POST `body` as JSON to `uri`
    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// POST raw bytes as JSON to `uri`
    pub async fn post_raw(&self, uri: &str, body: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

/// Body-less request without credentials
pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Names of the rows in a list view, in display order
pub fn item_names(view: &Value) -> Vec<String> {
    view["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}

/// Transcript texts of a dialog view
pub fn transcript(view: &Value) -> Vec<String> {
    view["transcript"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line["text"].as_str().unwrap().to_string())
        .collect()
}
