//! Blockchain-as-a-Service API client
//!
//! Two endpoints are used:
//! - `POST {base_url}/blockchainTask` submits a song for anchoring
//! - `POST {base_url}/blockchainTransaction/verify` checks a transaction
//!
//! Both authenticate with the `X-API-Key` header. Failures are terminal for
//! the request that triggered them; nothing is retried.

use serde_json::Value;
use songchain_common::models::{TaskRequest, VerifyRequest};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("songchain/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "X-API-Key";

/// Timeout applied to every BaaS request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// BaaS client errors
#[derive(Debug, Error)]
pub enum BaasError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {}s", REQUEST_TIMEOUT.as_secs())]
    Timeout,

    /// Non-success HTTP status with the raw response body
    #[error("{0} - {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Client configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for BaasError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BaasError::Timeout
        } else {
            BaasError::Network(e.to_string())
        }
    }
}

/// Result of a verification call that returned HTTP 200
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    Json(Value),
    /// Body was not JSON
    Text(String),
}

/// BaaS API client
#[derive(Clone)]
pub struct BaasClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl BaasClient {
    /// Create a client. A missing API key is sent as an empty header so the
    /// upstream error reaches the user.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, BaasError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BaasError::Config(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.unwrap_or_default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a registration task.
    ///
    /// Accepts HTTP 200 and 201. Returns the task id from `{data: {id}}`,
    /// or `None` when the response does not carry one.
    pub async fn submit_task(&self, request: &TaskRequest) -> Result<Option<String>, BaasError> {
        let url = format!("{}/blockchainTask", self.base_url);

        tracing::debug!(data_id = %request.data_id, url = %url, "Submitting BaaS task");

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if status != 200 && status != 201 {
            tracing::warn!(status, data_id = %request.data_id, "BaaS rejected task");
            return Err(BaasError::Api(status, body));
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| BaasError::Parse(e.to_string()))?;

        Ok(extract_task_id(&value))
    }

    /// Verify a transaction.
    ///
    /// Only HTTP 200 counts as success.
    pub async fn verify_transaction(
        &self,
        request: &VerifyRequest,
    ) -> Result<VerifyOutcome, BaasError> {
        let url = format!("{}/blockchainTransaction/verify", self.base_url);

        tracing::debug!(
            transaction_id = %request.transaction_id,
            has_payload = request.json_payload.is_some(),
            has_hash = request.json_payload_hash.is_some(),
            "Verifying transaction"
        );

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        if status != 200 {
            tracing::warn!(status, transaction_id = %request.transaction_id, "Verification failed");
            return Err(BaasError::Api(status, body));
        }

        Ok(match serde_json::from_str::<Value>(&body) {
            Ok(value) => VerifyOutcome::Json(value),
            Err(_) => VerifyOutcome::Text(body),
        })
    }
}

/// Pull `data.id` out of a task response; numeric ids are stringified
fn extract_task_id(response: &Value) -> Option<String> {
    match response.get("data")?.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
