//! Deterministic income/expense classification.
//!
//! Precedence:
//! 1. an explicit value the model gave that we recognize;
//! 2. a scan of the user's own text for receipt words (see [`FallbackPolicy`]
//!    for when this runs);
//! 3. expense.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use gofin_core::TxnKind;

const INCOME_WORDS: &[&str] = &["receita", "ganho", "entrada", "income"];
const EXPENSE_WORDS: &[&str] = &["despesa", "gasto", "saida", "saída", "expense"];

/// "received", "earned", "salary", "bonus"
static RECEIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)receb|ganh|sal[aá]r|b[oô]nus").expect("receipt pattern is valid")
});

/// When the text scan runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackPolicy {
    /// Only when the model gave no type at all; unknown values become expense
    #[default]
    AbsentOnly,
    /// Whenever the type is absent or unrecognized
    AnyUnrecognized,
}

/// Map a type word to a kind, case-insensitively.
pub fn recognize_kind(raw: &str) -> Option<TxnKind> {
    let t = raw.trim().to_lowercase();
    if INCOME_WORDS.contains(&t.as_str()) {
        Some(TxnKind::Income)
    } else if EXPENSE_WORDS.contains(&t.as_str()) {
        Some(TxnKind::Expense)
    } else {
        None
    }
}

/// True when the text reads like money coming in
pub fn looks_like_income(text: &str) -> bool {
    RECEIPT_RE.is_match(text)
}

fn scan(text: &str) -> TxnKind {
    if looks_like_income(text) {
        TxnKind::Income
    } else {
        TxnKind::Expense
    }
}

/// Classify one raw item. `text` is the user's original input.
pub fn classify_kind(raw: Option<&str>, text: &str, policy: FallbackPolicy) -> TxnKind {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    match raw {
        None => scan(text),
        Some(v) => match (recognize_kind(v), policy) {
            (Some(kind), _) => kind,
            (None, FallbackPolicy::AbsentOnly) => TxnKind::Expense,
            (None, FallbackPolicy::AnyUnrecognized) => scan(text),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_synonyms() {
        for w in ["receita", "Ganho", "ENTRADA", " receita "] {
            assert_eq!(recognize_kind(w), Some(TxnKind::Income), "{w}");
        }
    }

    #[test]
    fn test_expense_synonyms() {
        for w in ["despesa", "Gasto", "saida", "SAÍDA", "saída"] {
            assert_eq!(recognize_kind(w), Some(TxnKind::Expense), "{w}");
        }
    }

    #[test]
    fn test_unknown_word() {
        assert_eq!(recognize_kind("transfer"), None);
        assert_eq!(recognize_kind(""), None);
    }

    #[test]
    fn test_receipt_words() {
        assert!(looks_like_income("Recebi 1000 de salário"));
        assert!(looks_like_income("ganhei um BÔNUS"));
        assert!(looks_like_income("salario caiu"));
        assert!(!looks_like_income("Gastei 50 no mercado"));
    }

    #[test]
    fn test_explicit_value_wins_over_text() {
        let k = classify_kind(Some("despesa"), "Recebi 1000", FallbackPolicy::AnyUnrecognized);
        assert_eq!(k, TxnKind::Expense);
    }

    #[test]
    fn test_absent_type_scans_text() {
        for policy in [FallbackPolicy::AbsentOnly, FallbackPolicy::AnyUnrecognized] {
            assert_eq!(classify_kind(None, "Recebi 1000", policy), TxnKind::Income);
            assert_eq!(classify_kind(Some("  "), "Recebi 1000", policy), TxnKind::Income);
            assert_eq!(classify_kind(None, "Paguei a luz", policy), TxnKind::Expense);
        }
    }

    #[test]
    fn test_unrecognized_absent_only_defaults_to_expense() {
        let k = classify_kind(Some("transfer"), "Recebi 1000", FallbackPolicy::AbsentOnly);
        assert_eq!(k, TxnKind::Expense);
    }

    #[test]
    fn test_unrecognized_any_policy_scans_text() {
        let k = classify_kind(Some("transfer"), "Recebi 1000", FallbackPolicy::AnyUnrecognized);
        assert_eq!(k, TxnKind::Income);
        let k = classify_kind(Some("transfer"), "Paguei 20", FallbackPolicy::AnyUnrecognized);
        assert_eq!(k, TxnKind::Expense);
    }

    #[test]
    fn test_policy_config_names() {
        let p: FallbackPolicy = serde_json::from_str("\"any-unrecognized\"").unwrap();
        assert_eq!(p, FallbackPolicy::AnyUnrecognized);
        assert_eq!(FallbackPolicy::default(), FallbackPolicy::AbsentOnly);
    }
}
