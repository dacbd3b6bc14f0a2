//! Aggregate view over stored transactions (dashboard totals)

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::Serialize;

use crate::finance::CanonicalTransaction;
use crate::time::month_key;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_income: f64,
    pub total_expense: f64,
    /// income - expense
    pub balance: f64,
    /// Expenses only
    pub expenses_by_category: BTreeMap<String, f64>,
    /// Record counts keyed `YYYY-MM` in the caller's timezone
    pub transactions_by_month: BTreeMap<String, usize>,
}

/// Reduce records into totals by type, expense totals by category and
/// counts by calendar month.
pub fn summarize(records: &[CanonicalTransaction], tz: Tz) -> Summary {
    let mut s = Summary::default();

    for r in records {
        if r.is_income() {
            s.total_income += r.amount;
        } else {
            s.total_expense += r.amount;
            *s.expenses_by_category.entry(r.category.clone()).or_insert(0.0) += r.amount;
        }
        *s.transactions_by_month.entry(month_key(r.date, tz)).or_insert(0) += 1;
    }

    s.balance = s.total_income - s.total_expense;
    s
}
