use tracing::{info, warn};

use gofin_core::{IngestError, NewTransaction};

/// Keep items with a positive amount. An empty result fails the request.
pub fn filter_batch(items: Vec<NewTransaction>) -> Result<Vec<NewTransaction>, IngestError> {
    let total = items.len();
    let kept: Vec<NewTransaction> = items.into_iter().filter(NewTransaction::is_valid).collect();

    if kept.len() < total {
        info!(dropped = total - kept.len(), kept = kept.len(), "dropped invalid items");
    }
    if kept.is_empty() {
        warn!(total, "no valid transactions after filtering");
        return Err(IngestError::NoValidData);
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gofin_core::TxnKind;

    fn item(amount: f64) -> NewTransaction {
        NewTransaction {
            description: "x".to_string(),
            amount,
            kind: TxnKind::Expense,
            category: "other".to_string(),
            date: Utc.with_ymd_and_hms(2026, 2, 19, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_drops_zero_amounts_keeps_order() {
        let kept = filter_batch(vec![item(3.0), item(0.0), item(1.0)]).unwrap();
        let amounts: Vec<f64> = kept.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![3.0, 1.0]);
    }

    #[test]
    fn test_all_invalid_is_error() {
        assert!(matches!(
            filter_batch(vec![item(0.0), item(0.0)]),
            Err(IngestError::NoValidData)
        ));
    }

    #[test]
    fn test_empty_is_error() {
        assert!(matches!(filter_batch(vec![]), Err(IngestError::NoValidData)));
    }
}
