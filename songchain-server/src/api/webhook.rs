//! BaaS blockchain-notification webhook
//!
//! Matches notifications to records by `dataId` and applies the first
//! `BlockchainResults` entry. Unknown keys are acknowledged and dropped.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use songchain_common::webhook::{
    verify_signature, BlockchainNotification, SignatureError, SIGNATURE_HEADER,
};
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub message: String,
}

/// POST /webhook/blockchain-notification
pub async fn blockchain_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookResponse>> {
    if let Some(secret) = state.webhook_secret.as_deref() {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());
        verify_signature(provided, &body, secret).map_err(|e| match e {
            SignatureError::InvalidSecret(_) => {
                error!(error = %e, "Webhook secret cannot be used for verification");
                ApiError::Internal(format!("Webhook processing failed: {}", e))
            }
            _ => {
                warn!(error = %e, "Rejected webhook with bad signature");
                ApiError::Unauthorized(e.to_string())
            }
        })?;
    }

    let event = BlockchainNotification::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected malformed webhook body");
        ApiError::BadRequest(e.to_string())
    })?;

    info!(
        data_id = event.data_id.as_deref().unwrap_or("none"),
        schema = event.data_schema_name.as_deref().unwrap_or("none"),
        results = event.blockchain_results.as_ref().map(|r| r.len()).unwrap_or(0),
        "Received blockchain notification"
    );

    match event.data_id.as_deref() {
        Some(data_id) => {
            let update = event.status_update();
            match state.store.apply_update(data_id, &update).await {
                Some(song) => info!(
                    data_id = %data_id,
                    status = %song.status,
                    tx_id = song.blockchain_tx_id.as_deref().unwrap_or("none"),
                    "Updated song from webhook"
                ),
                None => info!(data_id = %data_id, "No song matches webhook dataId, ignoring"),
            }
        }
        None => info!("Webhook without dataId, ignoring"),
    }

    Ok(Json(WebhookResponse {
        message: "Webhook processed successfully".to_string(),
    }))
}

/// Build webhook routes
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route(
        "/webhook/blockchain-notification",
        post(blockchain_notification),
    )
}
