//! Verification page

use super::{escape, layout};

/// Everything the verification page shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyView {
    pub transaction_id: String,
    pub json_payload: String,
    pub json_payload_hash: String,
    pub error: Option<String>,
    /// Response body to display, already pretty-printed when it was JSON
    pub result: Option<String>,
}

/// Render the verification form plus any result or error
pub fn render_verify(view: &VerifyView) -> String {
    let error = view
        .error
        .as_deref()
        .map(|e| format!("<div class=\"flash flash-error\">{}</div>", escape(e)))
        .unwrap_or_default();

    let result = view
        .result
        .as_deref()
        .map(|r| format!("<h2>Verification Result</h2>\n    <pre>{}</pre>", escape(r)))
        .unwrap_or_default();

    let content = format!(
        r#"{error}
    <h2>Verify a Transaction</h2>
    <form method="post" action="/verify_transaction">
        <label for="transactionId">Transaction ID</label>
        <input id="transactionId" name="transactionId" value="{transaction_id}" required>
        <label for="jsonPayload">JSON payload (optional)</label>
        <textarea id="jsonPayload" name="jsonPayload" rows="8">{json_payload}</textarea>
        <label for="jsonPayloadHash">Payload hash (optional)</label>
        <input id="jsonPayloadHash" name="jsonPayloadHash" value="{json_payload_hash}">
        <button type="submit">Verify</button>
    </form>
    {result}"#,
        error = error,
        transaction_id = escape(&view.transaction_id),
        json_payload = escape(&view.json_payload),
        json_payload_hash = escape(&view.json_payload_hash),
        result = result,
    );

    layout("Verify Transaction", &content)
}
