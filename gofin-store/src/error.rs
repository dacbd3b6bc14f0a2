use thiserror::Error;

use gofin_core::IngestError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Transaction not found: {0}")]
    NotFound(String),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self {
        IngestError::Persistence(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
