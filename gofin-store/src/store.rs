//! SQLite persistence gateway: users, atomic batch inserts, listing and edits.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use gofin_core::{
    normalize_category, CanonicalTransaction, NewTransaction, TransactionEdit, TxnKind, User,
};

use crate::db::{get_connection, init_db};
use crate::error::{Result, StoreError};

pub const DEMO_EMAIL: &str = "demo@gofinance.local";
pub const DEMO_NAME: &str = "GoFinance Demo User";

/// The fallback account used when the caller supplies no identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccount {
    pub email: String,
    pub name: String,
}

impl Default for DemoAccount {
    fn default() -> Self {
        Self {
            email: DEMO_EMAIL.to_string(),
            name: DEMO_NAME.to_string(),
        }
    }
}

const TXN_COLUMNS: &str =
    "id, description, amount, type, category, date, user_id, created_at, updated_at";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (and create if needed) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        let conn = get_connection(path)?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    // --- users ---

    /// Use `user_id` as-is when non-empty, otherwise upsert the demo account.
    ///
    /// Caller-supplied ids are trusted; no existence check is made.
    pub fn resolve_user(&self, user_id: Option<&str>, demo: &DemoAccount) -> Result<String> {
        match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Ok(self.upsert_user(&demo.email, &demo.name)?.id),
        }
    }

    /// Create the user keyed by `email` unless it exists; never modifies an existing row.
    pub fn upsert_user(&self, email: &str, name: &str) -> Result<User> {
        let inserted = self.conn.execute(
            "INSERT INTO users (id, email, name, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(email) DO NOTHING",
            params![Uuid::new_v4().to_string(), email, name, Utc::now()],
        )?;
        if inserted > 0 {
            info!(email, "created user");
        }
        self.find_user_by_email(email)?
            .ok_or_else(|| StoreError::NotFound(format!("user {email}")))
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email, name, created_at FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        name: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    // --- transactions ---

    /// Insert `batch` for `user_id` in one SQL transaction.
    ///
    /// Any failing row rolls back the whole batch. Returned records keep the
    /// submission order.
    pub fn insert_batch(
        &mut self,
        user_id: &str,
        batch: &[NewTransaction],
    ) -> Result<Vec<CanonicalTransaction>> {
        let now = Utc::now();
        let tx = self.conn.transaction()?;
        let mut created = Vec::with_capacity(batch.len());
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO transactions ({TXN_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ))?;
            for t in batch {
                let record = CanonicalTransaction {
                    id: Uuid::new_v4().to_string(),
                    description: t.description.clone(),
                    amount: t.amount,
                    kind: t.kind,
                    category: t.category.clone(),
                    date: t.date,
                    user_id: user_id.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                stmt.execute(params![
                    record.id,
                    record.description,
                    record.amount,
                    record.kind.as_str(),
                    record.category,
                    record.date,
                    record.user_id,
                    record.created_at,
                    record.updated_at,
                ])?;
                created.push(record);
            }
        }
        tx.commit()?;
        info!(user_id, count = created.len(), "committed transaction batch");
        Ok(created)
    }

    /// A user's records, newest first
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<CanonicalTransaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TXN_COLUMNS} FROM transactions WHERE user_id = ?1
             ORDER BY date DESC, created_at DESC"
        ))?;
        let rows = stmt
            .query_map(params![user_id], row_to_txn)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get(&self, id: &str) -> Result<CanonicalTransaction> {
        self.conn
            .query_row(
                &format!("SELECT {TXN_COLUMNS} FROM transactions WHERE id = ?1"),
                params![id],
                row_to_txn,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Apply a partial edit and bump `updated_at`.
    pub fn update(&self, id: &str, edit: &TransactionEdit) -> Result<CanonicalTransaction> {
        let mut current = self.get(id)?;

        if let Some(d) = &edit.description {
            let d = d.trim();
            if d.is_empty() {
                return Err(StoreError::Invalid("description must not be empty".to_string()));
            }
            current.description = d.to_string();
        }
        if let Some(a) = edit.amount {
            if !a.is_finite() || a <= 0.0 {
                return Err(StoreError::Invalid(format!("amount must be positive, got {a}")));
            }
            current.amount = a;
        }
        if let Some(k) = edit.kind {
            current.kind = k;
        }
        if let Some(c) = &edit.category {
            current.category = normalize_category(Some(c));
        }
        current.updated_at = Utc::now();

        self.conn.execute(
            "UPDATE transactions
             SET description = ?2, amount = ?3, type = ?4, category = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                current.id,
                current.description,
                current.amount,
                current.kind.as_str(),
                current.category,
                current.updated_at,
            ],
        )?;
        debug!(id, "updated transaction");
        Ok(current)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        debug!(id, "deleted transaction");
        Ok(())
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?)
    }
}

fn row_to_txn(row: &Row<'_>) -> rusqlite::Result<CanonicalTransaction> {
    let kind: String = row.get(3)?;
    let kind = TxnKind::from_stored(&kind).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(3, "type".to_string(), rusqlite::types::Type::Text)
    })?;
    let date: DateTime<Utc> = row.get(5)?;
    Ok(CanonicalTransaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        kind,
        category: row.get(4)?,
        date,
        user_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
