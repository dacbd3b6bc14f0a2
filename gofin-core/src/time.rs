//! Time utilities: injected clock and timezone-aware calendar days.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Hour used when a transaction only carries a calendar day
pub const MIDDAY_HOUR: u32 = 12;

/// Source of "now" for the pipeline
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Parse an IANA timezone name like "America/Sao_Paulo".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Calendar day of `now` in `tz`
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// "Today" as `YYYY-MM-DD` in `tz`
pub fn today_string(now: DateTime<Utc>, tz: Tz) -> String {
    local_date(now, tz).format("%Y-%m-%d").to_string()
}

/// Midday of a calendar day in `tz`, returned as UTC.
///
/// Noon never falls in a DST gap, but `earliest()` keeps this total anyway.
pub fn midday_utc(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(MIDDAY_HOUR, 0, 0)?;
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Format a UTC time as `YYYY-MM` in `tz`.
pub fn month_key(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz).format("%Y-%m").to_string()
}
