//! Song record model and BaaS request payloads
//!
//! A [`SongRecord`] is the locally tracked view of a song submitted to the
//! notarization service. Its `data_id` is the correlation key that later
//! webhook notifications are matched against.

use serde::{Deserialize, Serialize};

/// Schema name sent with every registration task
pub const DATA_SCHEMA_NAME: &str = "songRegistry";

/// Version of the song payload layout
pub const PAYLOAD_VERSION: u32 = 4;

/// Required length of an owner (Algorand) address
pub const OWNER_ADDRESS_LEN: usize = 58;

/// Prefix of every correlation key
pub const DATA_ID_PREFIX: &str = "song_";

/// Blockchain status of a registered song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SongStatus {
    /// Submitted, waiting for a webhook
    #[default]
    Pending,
    /// Webhook reported success
    Confirmed,
    /// Webhook reported failure
    Failed,
}

impl SongStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SongStatus::Pending => "pending",
            SongStatus::Confirmed => "confirmed",
            SongStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SongStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Song data as hashed and anchored by the BaaS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPayload {
    pub application: String,
    pub version: u32,
    pub title: String,
    pub url: String,
    pub price: i64,
    pub owner: String,
    pub timestamp: String,
}

impl SongPayload {
    pub fn new(title: String, url: String, price: i64, owner: String, timestamp: String) -> Self {
        Self {
            application: DATA_SCHEMA_NAME.to_string(),
            version: PAYLOAD_VERSION,
            title,
            url,
            price,
            owner,
            timestamp,
        }
    }
}

/// Locally tracked song record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongRecord {
    /// 1-based local sequence number
    pub id: u64,
    /// Correlation key, never mutated after creation
    pub data_id: String,
    #[serde(flatten)]
    pub song: SongPayload,
    pub baas_task_id: Option<String>,
    pub status: SongStatus,
    pub blockchain_tx_id: Option<String>,
    pub explorer_url: Option<String>,
}

/// Status change carried by one webhook notification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    /// `Some(true)` confirms, `Some(false)` fails, `None` leaves status alone
    pub success: Option<bool>,
    pub transaction_id: Option<String>,
    pub explorer_url: Option<String>,
}

impl SongRecord {
    /// Apply a webhook update in place.
    ///
    /// Absent fields leave the stored values untouched, so replaying the same
    /// update is a no-op. Status only leaves `Pending`; once confirmed or
    /// failed it is final, and later events can only fill a transaction id or
    /// explorer URL that is still unset. Returns true if anything changed.
    pub fn apply(&mut self, update: &StatusUpdate) -> bool {
        let before = (
            self.status,
            self.blockchain_tx_id.clone(),
            self.explorer_url.clone(),
        );
        let pending = self.status == SongStatus::Pending;

        if pending {
            match update.success {
                Some(true) => self.status = SongStatus::Confirmed,
                Some(false) => self.status = SongStatus::Failed,
                None => {}
            }
        }
        if let Some(tx_id) = &update.transaction_id {
            if pending || self.blockchain_tx_id.is_none() {
                self.blockchain_tx_id = Some(tx_id.clone());
            }
        }
        if let Some(url) = &update.explorer_url {
            if pending || self.explorer_url.is_none() {
                self.explorer_url = Some(url.clone());
            }
        }

        before != (self.status, self.blockchain_tx_id.clone(), self.explorer_url.clone())
    }
}

/// Body of `POST {base_url}/blockchainTask`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub data_schema_name: String,
    pub data_id: String,
    pub json_payload: SongPayload,
}

impl TaskRequest {
    pub fn new(data_id: String, json_payload: SongPayload) -> Self {
        Self {
            data_schema_name: DATA_SCHEMA_NAME.to_string(),
            data_id,
            json_payload,
        }
    }
}

/// Body of `POST {base_url}/blockchainTransaction/verify`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_payload_hash: Option<String>,
}

/// Build the correlation key for a unix timestamp (seconds)
pub fn data_id_for(unix_seconds: i64) -> String {
    format!("{}{}", DATA_ID_PREFIX, unix_seconds)
}

/// Check an owner address against the length convention
pub fn is_valid_owner(owner: &str) -> bool {
    owner.chars().count() == OWNER_ADDRESS_LEN
}
