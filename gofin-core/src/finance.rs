//! Finance record types shared by the pipeline, the store and the CLI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned when the model gives none
pub const DEFAULT_CATEGORY: &str = "other";

/// Direction of a transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TxnKind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl TxnKind {
    /// Stable name used in storage and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnKind::Income => "income",
            TxnKind::Expense => "expense",
        }
    }

    /// Parse a stored name back into a kind
    pub fn from_stored(s: &str) -> Option<Self> {
        match s {
            "income" => Some(TxnKind::Income),
            "expense" => Some(TxnKind::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TxnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized transaction that has not been persisted yet.
///
/// Produced by the normalizer. `amount` may still be 0 here; the batch
/// filter drops those before anything reaches storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    pub kind: TxnKind,
    pub category: String,
    pub date: DateTime<Utc>,
}

impl NewTransaction {
    /// True when the record may be persisted
    pub fn is_valid(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0
    }
}

/// A persisted transaction, owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTransaction {
    /// Storage-assigned identifier
    pub id: String,
    pub description: String,
    /// Always > 0; direction lives in `kind`
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TxnKind,
    /// Lowercase, never empty
    pub category: String,
    pub date: DateTime<Utc>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CanonicalTransaction {
    pub fn is_income(&self) -> bool {
        self.kind == TxnKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TxnKind::Expense
    }
}

/// Account that owns transactions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Partial edit of a stored transaction; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionEdit {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub kind: Option<TxnKind>,
    pub category: Option<String>,
}

/// Lowercase a category, falling back to [`DEFAULT_CATEGORY`] when blank
pub fn normalize_category(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_lowercase(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kind_round_trips_through_storage_name() {
        assert_eq!(TxnKind::from_stored("income"), Some(TxnKind::Income));
        assert_eq!(TxnKind::from_stored(TxnKind::Expense.as_str()), Some(TxnKind::Expense));
        assert_eq!(TxnKind::from_stored("receita"), None);
    }

    #[test]
    fn test_new_transaction_validity() {
        let date = Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap();
        let mut t = NewTransaction {
            description: "Mercado".to_string(),
            amount: 50.0,
            kind: TxnKind::Expense,
            category: "mercado".to_string(),
            date,
        };
        assert!(t.is_valid());
        t.amount = 0.0;
        assert!(!t.is_valid());
        t.amount = f64::NAN;
        assert!(!t.is_valid());
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(Some("Mercado")), "mercado");
        assert_eq!(normalize_category(Some("  ")), "other");
        assert_eq!(normalize_category(None), "other");
    }

    #[test]
    fn test_canonical_serializes_type_field() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 18, 12, 0, 0).unwrap();
        let t = CanonicalTransaction {
            id: "t-1".to_string(),
            description: "Salário".to_string(),
            amount: 1000.0,
            kind: TxnKind::Income,
            category: "salario".to_string(),
            date: ts,
            user_id: "u-1".to_string(),
            created_at: ts,
            updated_at: ts,
        };
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["type"], "income");
        assert_eq!(v["userId"], "u-1");
        assert!(v.get("createdAt").is_some());
    }
}
