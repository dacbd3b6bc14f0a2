use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One transaction as the model returned it. Nothing here is trusted.
///
/// String fields accept any JSON scalar so a model that answers
/// `"category": 3` still deserializes; anything else becomes `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawModelTransaction {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
}

impl RawModelTransaction {
    /// Coerce `amount` to a number.
    ///
    /// Absent or null is 0; strings are parsed (comma decimals and an `R$`
    /// prefix accepted); anything unparseable is NaN.
    pub fn amount_as_number(&self) -> f64 {
        match &self.amount {
            None | Some(Value::Null) => 0.0,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(s)) => parse_number_like(s),
            Some(Value::Bool(b)) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
        }
    }
}

/// Decoded model payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub transactions: Vec<RawModelTransaction>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn parse_number_like(s: &str) -> f64 {
    let s = s.trim();
    let (s, currency) = match s.strip_prefix("R$") {
        Some(rest) => (rest.trim(), true),
        None => (s, false),
    };
    if s.is_empty() {
        return 0.0;
    }
    // "1.234,56" -> "1234.56"; "12,5" -> "12.5"; "R$ 1.234" -> "1234"
    let cleaned = if s.contains(',') || (currency && is_grouped_thousands(s)) {
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_string()
    };
    cleaned.parse().unwrap_or(f64::NAN)
}

/// `1.234` or `12.345.678`: dots only between groups of exactly three digits
fn is_grouped_thousands(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut groups = digits.split('.');
    let Some(head) = groups.next() else {
        return false;
    };
    let head_ok = (1..=3).contains(&head.len()) && head.bytes().all(|b| b.is_ascii_digit());
    let mut tail = groups.peekable();
    head_ok
        && tail.peek().is_some()
        && tail.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> RawModelTransaction {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let r = raw(json!({}));
        assert_eq!(r, RawModelTransaction::default());
        assert_eq!(r.amount_as_number(), 0.0);
    }

    #[test]
    fn test_non_string_scalars_become_strings() {
        let r = raw(json!({"category": 3, "type": true, "description": ["x"]}));
        assert_eq!(r.category.as_deref(), Some("3"));
        assert_eq!(r.kind.as_deref(), Some("true"));
        assert_eq!(r.description, None);
    }

    #[test]
    fn test_currency_thousands_without_decimals() {
        assert_eq!(raw(json!({"amount": "R$ 1.234"})).amount_as_number(), 1234.0);
        assert_eq!(raw(json!({"amount": "R$1.234.567"})).amount_as_number(), 1234567.0);
        assert_eq!(raw(json!({"amount": "R$ 12.50"})).amount_as_number(), 12.5);
        assert_eq!(raw(json!({"amount": "R$ 0.5"})).amount_as_number(), 0.5);
    }

    #[test]
    fn test_amount_coercion() {
        assert_eq!(raw(json!({"amount": 80})).amount_as_number(), 80.0);
        assert_eq!(raw(json!({"amount": -5.5})).amount_as_number(), -5.5);
        assert_eq!(raw(json!({"amount": "42.10"})).amount_as_number(), 42.10);
        assert_eq!(raw(json!({"amount": "12,5"})).amount_as_number(), 12.5);
        assert_eq!(raw(json!({"amount": "R$ 1.234,56"})).amount_as_number(), 1234.56);
        assert!(raw(json!({"amount": "abc"})).amount_as_number().is_nan());
        // a bare "1.234" stays a decimal; the currency prefix marks it as grouped
        assert_eq!(raw(json!({"amount": "1.234"})).amount_as_number(), 1.234);
        assert!(raw(json!({"amount": {"v": 1}})).amount_as_number().is_nan());
        assert_eq!(raw(json!({"amount": null})).amount_as_number(), 0.0);
    }
}
