//! Error taxonomy for the ingest pipeline.
//!
//! Every variant carries internal detail for logs; callers only ever see
//! [`IngestError::public_message`] and [`IngestError::status`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Bad or missing input text
    #[error("invalid request: {0}")]
    Validation(String),

    /// The upstream credential is absent
    #[error("upstream API key is not configured")]
    Configuration,

    /// Transport failure or non-success status from the model service
    #[error("upstream call failed: {0}")]
    Upstream(String),

    /// The model reply carried no completion payload
    #[error("upstream reply had no content")]
    EmptyReply,

    /// The completion payload is not JSON of the expected shape
    #[error("upstream reply could not be parsed: {0}")]
    Parse(String),

    /// Nothing survived normalization and filtering
    #[error("no valid transactions in reply")]
    NoValidData,

    /// Storage write or read failed
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Anything else that went wrong after the request was accepted
    #[error("internal error: {0}")]
    Internal(String),
}

impl IngestError {
    /// HTTP-style status code for this error
    pub fn status(&self) -> u16 {
        match self {
            IngestError::Validation(_) | IngestError::NoValidData => 400,
            IngestError::Configuration
            | IngestError::Upstream(_)
            | IngestError::EmptyReply
            | IngestError::Parse(_)
            | IngestError::Persistence(_)
            | IngestError::Internal(_) => 500,
        }
    }

    /// Generic message safe to return to the caller
    pub fn public_message(&self) -> &'static str {
        match self {
            IngestError::Validation(_) => "Text is required",
            IngestError::Configuration => "Model API key not configured",
            IngestError::Upstream(_) => "Failed to call model API",
            IngestError::EmptyReply => "Empty response from model",
            IngestError::Parse(_) => "Invalid JSON from model",
            IngestError::NoValidData => "No valid transactions found in text",
            IngestError::Persistence(_) | IngestError::Internal(_) => "Internal server error",
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
