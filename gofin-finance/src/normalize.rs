//! Raw model item -> [`NewTransaction`]. Never fails; bad amounts become 0
//! and are dropped by the batch filter.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use gofin_core::time::{local_date, midday_utc};
use gofin_core::{normalize_category, NewTransaction};
use gofin_ingest::RawModelTransaction;

use crate::classify::{classify_kind, FallbackPolicy};

/// Characters of the input text used when the model gives no description
pub const DESCRIPTION_FALLBACK_CHARS: usize = 80;

/// Per-request inputs shared by every item in a reply
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    /// The user's original text
    pub text: &'a str,
    pub now: DateTime<Utc>,
    pub tz: Tz,
    pub fallback: FallbackPolicy,
}

impl NormalizeContext<'_> {
    fn today(&self) -> NaiveDate {
        local_date(self.now, self.tz)
    }
}

pub fn normalize(raw: &RawModelTransaction, ctx: &NormalizeContext<'_>) -> NewTransaction {
    NewTransaction {
        description: resolve_description(raw.description.as_deref(), ctx.text),
        amount: sanitize_amount(raw.amount_as_number()),
        kind: classify_kind(raw.kind.as_deref(), ctx.text, ctx.fallback),
        category: normalize_category(raw.category.as_deref()),
        date: resolve_date(raw.date.as_deref(), ctx),
    }
}

pub fn resolve_description(raw: Option<&str>, text: &str) -> String {
    match raw.map(str::trim) {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => text.trim().chars().take(DESCRIPTION_FALLBACK_CHARS).collect(),
    }
}

/// Non-finite, zero or negative -> 0. The sign is never flipped.
pub fn sanitize_amount(n: f64) -> f64 {
    if n.is_finite() && n > 0.0 { n } else { 0.0 }
}

/// Absent, unparseable or "today" -> `now`; any other day -> midday of that day in `tz`.
pub fn resolve_date(raw: Option<&str>, ctx: &NormalizeContext<'_>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return ctx.now;
    };
    let Some(day) = parse_day(raw, ctx.tz) else {
        return ctx.now;
    };
    if day == ctx.today() {
        return ctx.now;
    }
    midday_utc(day, ctx.tz).unwrap_or(ctx.now)
}

/// `YYYY-MM-DD`, or the local day of an RFC 3339 timestamp
fn parse_day(raw: &str, tz: Tz) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| local_date(dt.with_timezone(&Utc), tz))
}
