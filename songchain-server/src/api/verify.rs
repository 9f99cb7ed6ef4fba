//! Transaction verification
//!
//! Pure passthrough to the BaaS verification endpoint; no local state changes.

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use songchain_common::models::VerifyRequest;
use tracing::{info, warn};

use crate::api::ui::{render_verify, VerifyView};
use crate::services::{BaasError, VerifyOutcome};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyForm {
    #[serde(rename = "transactionId")]
    pub transaction_id: Option<String>,
    #[serde(rename = "jsonPayload")]
    pub json_payload: Option<String>,
    #[serde(rename = "jsonPayloadHash")]
    pub json_payload_hash: Option<String>,
}

impl VerifyForm {
    /// Build the upstream request, or the message to show instead.
    ///
    /// Blank optional fields count as absent.
    pub fn to_request(&self) -> Result<VerifyRequest, String> {
        let transaction_id = self
            .transaction_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "Transaction ID is required".to_string())?;

        let json_payload = match self.json_payload.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                serde_json::from_str(raw).map_err(|e| format!("Invalid JSON payload: {}", e))?,
            ),
            _ => None,
        };

        let json_payload_hash = self
            .json_payload_hash
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        Ok(VerifyRequest {
            transaction_id: transaction_id.to_string(),
            json_payload,
            json_payload_hash,
        })
    }

    fn view(&self) -> VerifyView {
        VerifyView {
            transaction_id: self.transaction_id.clone().unwrap_or_default(),
            json_payload: self.json_payload.clone().unwrap_or_default(),
            json_payload_hash: self.json_payload_hash.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

/// GET /verify_transaction
pub async fn verify_page(Query(query): Query<VerifyQuery>) -> Html<String> {
    Html(render_verify(&VerifyView {
        transaction_id: query.transaction_id.unwrap_or_default(),
        ..Default::default()
    }))
}

/// POST /verify_transaction
pub async fn verify_transaction(
    State(state): State<AppState>,
    Form(form): Form<VerifyForm>,
) -> Html<String> {
    let mut view = form.view();

    let request = match form.to_request() {
        Ok(request) => request,
        Err(message) => {
            warn!(error = %message, "Rejected verification request");
            view.error = Some(message);
            return Html(render_verify(&view));
        }
    };

    match state.baas.verify_transaction(&request).await {
        Ok(VerifyOutcome::Json(value)) => {
            info!(transaction_id = %request.transaction_id, "Verification completed");
            view.result =
                Some(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()));
        }
        Ok(VerifyOutcome::Text(text)) => {
            info!(transaction_id = %request.transaction_id, "Verification completed (non-JSON body)");
            view.result = Some(text);
        }
        Err(BaasError::Api(status, body)) => {
            view.error = Some(format!("Verification failed: {} - {}", status, body));
        }
        Err(e) => {
            view.error = Some(format!("Error verifying transaction: {}", e));
        }
    }

    Html(render_verify(&view))
}

/// Build verification routes
pub fn verify_routes() -> Router<AppState> {
    Router::new().route("/verify_transaction", get(verify_page).post(verify_transaction))
}
