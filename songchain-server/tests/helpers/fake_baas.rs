//! Fake BaaS server
//!
//! Serves `/blockchainTask` and `/blockchainTransaction/verify` with canned
//! responses and records every request it receives.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// One request as seen by the fake
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone)]
struct Canned {
    status: u16,
    body: String,
}

#[derive(Default)]
struct Inner {
    task: Option<Canned>,
    verify: Option<Canned>,
    requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<Inner>>;

/// Running fake BaaS instance
pub struct FakeBaas {
    addr: SocketAddr,
    inner: Shared,
}

impl FakeBaas {
    /// Start on an ephemeral localhost port.
    ///
    /// Defaults: task → 201 `{"data":{"id":"t1"}}`, verify → 200 `{"verified":true}`.
    pub async fn start() -> Self {
        let inner: Shared = Arc::new(Mutex::new(Inner {
            task: Some(Canned {
                status: 201,
                body: r#"{"data":{"id":"t1"}}"#.to_string(),
            }),
            verify: Some(Canned {
                status: 200,
                body: r#"{"verified":true}"#.to_string(),
            }),
            requests: Vec::new(),
        }));

        let app = Router::new()
            .route("/api/v1/blockchainTask", post(task))
            .route("/api/v1/blockchainTransaction/verify", post(verify))
            .with_state(inner.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Should bind fake BaaS");
        let addr = listener.local_addr().expect("Should have local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, inner }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub fn respond_to_task(&self, status: u16, body: &str) {
        self.inner.lock().unwrap().task = Some(Canned { status, body: body.to_string() });
    }

    pub fn respond_to_verify(&self, status: u16, body: &str) {
        self.inner.lock().unwrap().verify = Some(Canned { status, body: body.to_string() });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }
}

fn record(inner: &Shared, path: &str, headers: &HeaderMap, body: &Bytes) {
    let api_key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(body).unwrap_or(serde_json::Value::Null);
    inner.lock().unwrap().requests.push(RecordedRequest {
        path: path.to_string(),
        api_key,
        body,
    });
}

fn reply(canned: Option<Canned>) -> (StatusCode, String) {
    match canned {
        Some(c) => (
            StatusCode::from_u16(c.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            c.body,
        ),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn task(State(inner): State<Shared>, headers: HeaderMap, body: Bytes) -> (StatusCode, String) {
    record(&inner, "/blockchainTask", &headers, &body);
    let canned = inner.lock().unwrap().task.clone();
    reply(canned)
}

async fn verify(State(inner): State<Shared>, headers: HeaderMap, body: Bytes) -> (StatusCode, String) {
    record(&inner, "/blockchainTransaction/verify", &headers, &body);
    let canned = inner.lock().unwrap().verify.clone();
    reply(canned)
}
