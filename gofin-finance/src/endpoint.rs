//! Request/response envelope for the ingest endpoint.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use gofin_core::{CanonicalTransaction, IngestError};

/// Validated ingest body: `{ "text": string, "userId"?: string }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestRequest {
    pub text: String,
    pub user_id: Option<String>,
}

impl IngestRequest {
    pub fn new(text: impl Into<String>, user_id: Option<String>) -> Result<Self, IngestError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(IngestError::Validation("text is empty".to_string()));
        }
        let user_id = user_id.filter(|u| !u.trim().is_empty());
        Ok(Self { text, user_id })
    }

    /// Validate a decoded JSON body. A non-string `userId` is ignored.
    pub fn from_json(body: &Value) -> Result<Self, IngestError> {
        let text = match body.get("text") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(IngestError::Validation("text is not a string".to_string())),
            None => return Err(IngestError::Validation("text is missing".to_string())),
        };
        let user_id = body
            .get("userId")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self::new(text, user_id)
    }
}

/// Status code plus JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct IngestResponse {
    pub status: u16,
    pub body: Value,
}

impl IngestResponse {
    /// 200 with the serialized records; an encoding failure is a logged 500
    pub fn ok<T: Serialize + ?Sized>(records: &T) -> Self {
        match serde_json::to_value(records) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::error(&IngestError::Internal(format!(
                "encode created records: {e}"
            ))),
        }
    }

    /// Log the full error and return only its public message
    pub fn error(err: &IngestError) -> Self {
        error!(status = err.status(), error = %err, "ingest request failed");
        Self {
            status: err.status(),
            body: json!({ "error": err.public_message() }),
        }
    }

    pub fn from_result(res: Result<Vec<CanonicalTransaction>, IngestError>) -> Self {
        match res {
            Ok(records) => Self::ok(&records),
            Err(e) => Self::error(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
