//! Blockchain notification webhook: payload types and sender verification
//!
//! # Payload
//!
//! The BaaS calls back with
//! `{dataId, BlockchainResults: [{transactionId, transactionExplorerUrl, isSuccess}], ...}`.
//! Only the first entry of `BlockchainResults` is used. The older flat shape
//! (`transactionId` / `status` at the top level) is not interpreted.
//!
//! # Signature
//!
//! When a webhook secret is configured, senders must include
//! `X-Webhook-Signature: sha256=<hex>` where the digest is
//! HMAC-SHA256 over the raw request body, keyed with the secret.
//!
//! This module contains ONLY pure functions; the HTTP wiring lives in the server.

use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha256;
use thiserror::Error;

use crate::models::StatusUpdate;

/// Header carrying the body signature
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Scheme prefix of the signature header value
pub const SIGNATURE_PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

// ========================================
// Payload Types
// ========================================

/// One entry of the `BlockchainResults` list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockchainResult {
    pub transaction_id: Option<String>,
    pub transaction_explorer_url: Option<String>,
    pub is_success: Option<bool>,
}

impl BlockchainResult {
    fn from_value(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            return Self::default();
        };
        Self {
            transaction_id: text_field(fields, "transactionId"),
            transaction_explorer_url: text_field(fields, "transactionExplorerUrl"),
            is_success: fields.get("isSuccess").and_then(Value::as_bool),
        }
    }
}

/// Inbound blockchain notification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockchainNotification {
    pub data_schema_name: Option<String>,
    pub data_id: Option<String>,
    pub blockchain_results: Option<Vec<BlockchainResult>>,
}

impl BlockchainNotification {
    /// Parse a raw webhook body.
    ///
    /// Empty bodies, invalid JSON and non-object JSON are rejected. Inside the
    /// object, numeric ids are read as strings and fields of any other
    /// unexpected type count as absent.
    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(PayloadError::Empty);
        }

        let value: Value =
            serde_json::from_slice(body).map_err(|e| PayloadError::InvalidJson(e.to_string()))?;
        let fields = value.as_object().ok_or(PayloadError::NotAnObject)?;

        Ok(Self {
            data_schema_name: text_field(fields, "dataSchemaName"),
            data_id: text_field(fields, "dataId"),
            blockchain_results: fields
                .get("BlockchainResults")
                .and_then(Value::as_array)
                .map(|results| results.iter().map(BlockchainResult::from_value).collect()),
        })
    }

    /// First reported blockchain result, if any
    pub fn first_result(&self) -> Option<&BlockchainResult> {
        self.blockchain_results.as_ref()?.first()
    }

    /// Status change described by this notification
    pub fn status_update(&self) -> StatusUpdate {
        match self.first_result() {
            Some(result) => StatusUpdate {
                success: result.is_success,
                transaction_id: result.transaction_id.clone(),
                explorer_url: result.transaction_explorer_url.clone(),
            },
            None => StatusUpdate::default(),
        }
    }
}

/// String or number field as text
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Webhook body rejection reasons
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Missing request body")]
    Empty,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Expected a JSON object")]
    NotAnObject,
}

// ========================================
// Signature Calculation and Validation
// ========================================

/// Signature rejection reasons
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// Header absent
    #[error("Missing webhook signature")]
    Missing,

    /// Header present but not `sha256=<64 hex chars>`
    #[error("Malformed webhook signature")]
    Malformed,

    /// Digest does not match
    #[error("Invalid webhook signature")]
    Mismatch,

    /// Secret cannot key the MAC
    #[error("Invalid webhook secret: {0}")]
    InvalidSecret(String),
}

fn keyed_mac(secret: &str) -> Result<HmacSha256, SignatureError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SignatureError::InvalidSecret(e.to_string()))
}

/// Calculate the signature header value for a body
///
/// # Examples
///
/// ```
/// use songchain_common::webhook::sign_body;
///
/// let signature = sign_body(b"{}", "secret").unwrap();
/// assert!(signature.starts_with("sha256="));
/// assert_eq!(signature.len(), 7 + 64);
/// ```
pub fn sign_body(body: &[u8], secret: &str) -> Result<String, SignatureError> {
    let mut mac = keyed_mac(secret)?;
    mac.update(body);
    Ok(format!(
        "{}{}",
        SIGNATURE_PREFIX,
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Validate a signature header value against the body
pub fn verify_signature(
    provided: Option<&str>,
    body: &[u8],
    secret: &str,
) -> Result<(), SignatureError> {
    let provided = provided.ok_or(SignatureError::Missing)?.trim();

    let digest = provided
        .strip_prefix(SIGNATURE_PREFIX)
        .and_then(|encoded| hex::decode(encoded).ok())
        .filter(|digest| digest.len() == 32)
        .ok_or(SignatureError::Malformed)?;

    let mut mac = keyed_mac(secret)?;
    mac.update(body);
    mac.verify_slice(&digest)
        .map_err(|_| SignatureError::Mismatch)
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_notification() {
        let body = br#"{
            "dataSchemaName": "songRegistry",
            "dataId": "song_1",
            "BlockchainResults": [
                {"transactionId": "tx1", "transactionExplorerUrl": "https://x/tx1", "isSuccess": true},
                {"transactionId": "tx2", "isSuccess": false}
            ]
        }"#;
        let event = BlockchainNotification::from_slice(body).unwrap();
        assert_eq!(event.data_id.as_deref(), Some("song_1"));

        let update = event.status_update();
        assert_eq!(update.success, Some(true));
        assert_eq!(update.transaction_id.as_deref(), Some("tx1"));
        assert_eq!(update.explorer_url.as_deref(), Some("https://x/tx1"));
    }

    #[test]
    fn test_parse_without_results() {
        let event = BlockchainNotification::from_slice(br#"{"dataId": "song_1"}"#).unwrap();
        assert!(event.first_result().is_none());
        assert_eq!(event.status_update(), StatusUpdate::default());

        let empty = BlockchainNotification::from_slice(br#"{"dataId": "song_1", "BlockchainResults": []}"#)
            .unwrap();
        assert!(empty.first_result().is_none());
    }

    #[test]
    fn test_flat_legacy_shape_is_not_interpreted() {
        let event = BlockchainNotification::from_slice(
            br#"{"dataId": "song_1", "transactionId": "tx1", "status": "success"}"#,
        )
        .unwrap();
        assert_eq!(event.status_update(), StatusUpdate::default());
    }

    #[test]
    fn test_rejects_bad_bodies() {
        assert_eq!(BlockchainNotification::from_slice(b""), Err(PayloadError::Empty));
        assert_eq!(BlockchainNotification::from_slice(b"  \n"), Err(PayloadError::Empty));
        assert!(matches!(
            BlockchainNotification::from_slice(b"not json"),
            Err(PayloadError::InvalidJson(_))
        ));
        assert_eq!(
            BlockchainNotification::from_slice(b"[1, 2]"),
            Err(PayloadError::NotAnObject)
        );
    }

    #[test]
    fn test_numeric_ids_read_as_text() {
        let event = BlockchainNotification::from_slice(
            br#"{"dataId": 42, "BlockchainResults": [{"transactionId": 12345, "isSuccess": true}]}"#,
        )
        .unwrap();
        assert_eq!(event.data_id.as_deref(), Some("42"));

        let update = event.status_update();
        assert_eq!(update.transaction_id.as_deref(), Some("12345"));
        assert_eq!(update.success, Some(true));
    }

    #[test]
    fn test_mistyped_fields_count_as_absent() {
        let event = BlockchainNotification::from_slice(
            br#"{"dataId": "song_1", "BlockchainResults": [{"transactionId": ["x"], "isSuccess": "true"}]}"#,
        )
        .unwrap();
        assert_eq!(event.status_update(), StatusUpdate::default());

        let object_results = BlockchainNotification::from_slice(
            br#"{"dataId": "song_1", "BlockchainResults": {"transactionId": "tx1"}}"#,
        )
        .unwrap();
        assert!(object_results.first_result().is_none());

        let bad_id = BlockchainNotification::from_slice(br#"{"dataId": null}"#).unwrap();
        assert!(bad_id.data_id.is_none());
    }

    #[test]
    fn test_signature_is_hmac_sha256() {
        // RFC 4231 test case 2
        let signature = sign_body(b"what do ya want for nothing?", "Jefe").unwrap();
        assert_eq!(
            signature,
            "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_signature_roundtrip() {
        let body = br#"{"dataId":"song_1"}"#;
        let signature = sign_body(body, "s3cret").unwrap();
        assert!(verify_signature(Some(&signature), body, "s3cret").is_ok());
        assert!(verify_signature(Some(&signature.to_uppercase().replace("SHA256=", "sha256=")), body, "s3cret").is_ok());
    }

    #[test]
    fn test_signature_rejections() {
        let body = br#"{"dataId":"song_1"}"#;
        let signature = sign_body(body, "s3cret").unwrap();

        assert_eq!(verify_signature(None, body, "s3cret"), Err(SignatureError::Missing));
        assert_eq!(
            verify_signature(Some("md5=abc"), body, "s3cret"),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature(Some("sha256=zz"), body, "s3cret"),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature(Some("sha256=abcd"), body, "s3cret"),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            verify_signature(Some(&signature), body, "other"),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify_signature(Some(&signature), br#"{"dataId":"song_2"}"#, "s3cret"),
            Err(SignatureError::Mismatch)
        );
    }
}
