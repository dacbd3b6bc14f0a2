//! Decode the model service reply into raw transactions.
//!
//! Two layers: the service envelope (`choices[0].message.content`) and the
//! JSON document the model wrote inside it.

use serde_json::Value;
use tracing::{debug, error};

use gofin_core::IngestError;

use crate::types::{ModelReply, RawModelTransaction};

/// Pull the completion text out of a chat-completions envelope.
pub fn extract_content(raw: &str) -> Result<String, IngestError> {
    let envelope: Value = serde_json::from_str(raw).map_err(|e| {
        error!(raw = %raw, "model service reply is not JSON");
        IngestError::Parse(format!("service envelope: {e}"))
    })?;

    let content = envelope
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if content.is_empty() {
        error!(reply = %envelope, "model returned empty content");
        return Err(IngestError::EmptyReply);
    }
    Ok(content.to_string())
}

/// Decode the model's JSON payload.
///
/// A missing or null `transactions` is an empty list; entries that are not
/// objects become empty raw records and are filtered out later.
pub fn parse_content(content: &str) -> Result<ModelReply, IngestError> {
    let body = strip_code_fence(content);
    let doc: Value = serde_json::from_str(body).map_err(|e| {
        error!(content = %content, "failed to decode model JSON");
        IngestError::Parse(e.to_string())
    })?;

    let Value::Object(mut obj) = doc else {
        error!(content = %content, "model JSON is not an object");
        return Err(IngestError::Parse("expected a JSON object".to_string()));
    };

    let items = match obj.remove("transactions") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            error!(content = %content, "transactions is not a list");
            return Err(IngestError::Parse(format!(
                "transactions is not a list: {other}"
            )));
        }
    };

    let transactions = items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<RawModelTransaction>(item).unwrap_or_else(|e| {
                debug!(error = %e, "unusable transaction entry");
                RawModelTransaction::default()
            })
        })
        .collect();

    Ok(ModelReply { transactions })
}

/// Envelope + payload in one step
pub fn parse_reply(raw: &str) -> Result<ModelReply, IngestError> {
    let content = extract_content(raw)?;
    parse_content(&content)
}

/// Some models wrap JSON in ```json fences even when told not to
fn strip_code_fence(s: &str) -> &str {
    let s = s.trim();
    match s.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => s,
    }
}
