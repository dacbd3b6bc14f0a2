//! gofin-core: core types and utilities for the GoFinance ingest pipeline

pub mod error;
pub mod finance;
pub mod summary;
pub mod time;

pub use error::IngestError;
pub use finance::{
    normalize_category, CanonicalTransaction, NewTransaction, TransactionEdit, TxnKind, User,
    DEFAULT_CATEGORY,
};
pub use summary::{summarize, Summary};
pub use time::{Clock, FixedClock, SystemClock};
