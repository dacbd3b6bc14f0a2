//! gofin-store: SQLite persistence for users and transactions

pub mod db;
pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::{DemoAccount, SqliteStore, DEMO_EMAIL, DEMO_NAME};
