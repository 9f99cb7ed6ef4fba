//! Test helper modules for songchain-server integration tests
//!
//! - FakeBaas: scriptable stand-in for the BaaS API on an ephemeral port
//! - TestApp: router + store wired to a FakeBaas

#![allow(dead_code)]

pub mod fake_baas;

pub use fake_baas::{FakeBaas, RecordedRequest};

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

use songchain_server::services::BaasClient;
use songchain_server::store::{InMemorySongStore, SongStore};
use songchain_server::{build_router, AppState};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_SESSION_SECRET: &str = "test-session-secret";

/// Router plus direct access to its store
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemorySongStore>,
}

impl TestApp {
    pub fn new(baas: &FakeBaas) -> Self {
        Self::with_webhook_secret(baas, None)
    }

    pub fn with_webhook_secret(baas: &FakeBaas, webhook_secret: Option<&str>) -> Self {
        let store = Arc::new(InMemorySongStore::new());
        let client = BaasClient::new(&baas.base_url(), Some(TEST_API_KEY.to_string()))
            .expect("Should create BaaS client");
        let state = AppState::new(
            store.clone() as Arc<dyn SongStore>,
            client,
            webhook_secret.map(str::to_string),
            TEST_SESSION_SECRET,
        );
        Self {
            router: build_router(state),
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router should not fail")
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// POST an urlencoded form (fields are encoded here)
pub fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// `name=value` pair of the first Set-Cookie header, for replaying
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}

pub fn valid_owner() -> String {
    "A".repeat(58)
}
