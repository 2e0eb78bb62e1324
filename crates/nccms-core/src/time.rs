//! Relative-time labels for dashboard cards
//!
//! Timestamps are pulled from loosely-typed CMS records using a fixed,
//! priority-ordered list of field names, and the most recent one is rendered
//! as an English phrase such as "3 days ago" or "yesterday".

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Field names inspected for a record timestamp, highest priority first
pub const TIMESTAMP_KEYS: [&str; 8] = [
    "updated_at",
    "modified_at",
    "updated",
    "modified",
    "last_updated",
    "last_modified",
    "published_at",
    "created_at",
];

/// Differences smaller than this many milliseconds read as "just now"
const JUST_NOW_MS: i64 = 45_000;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelativeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl RelativeUnit {
    const fn name(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// English phrase with idiomatic forms for 0 and ±1 where they exist
    fn phrase(self, value: i64) -> String {
        match (self, value) {
            (Self::Second, 0) => return "now".to_string(),
            (Self::Day, 0) => return "today".to_string(),
            (Self::Day, -1) => return "yesterday".to_string(),
            (Self::Day, 1) => return "tomorrow".to_string(),
            (Self::Minute | Self::Hour | Self::Week | Self::Month | Self::Year, 0) => {
                return format!("this {}", self.name());
            }
            (Self::Week | Self::Month | Self::Year, -1) => {
                return format!("last {}", self.name());
            }
            (Self::Week | Self::Month | Self::Year, 1) => {
                return format!("next {}", self.name());
            }
            _ => {}
        }

        let count = value.unsigned_abs();
        let plural = if count == 1 { "" } else { "s" };
        if value < 0 {
            format!("{count} {}{plural} ago", self.name())
        } else {
            format!("in {count} {}{plural}", self.name())
        }
    }
}

/// Breakpoints: a value below `amount` is expressed in `unit`, otherwise divided through
const DIVISIONS: [(f64, RelativeUnit); 7] = [
    (60.0, RelativeUnit::Second),
    (60.0, RelativeUnit::Minute),
    (24.0, RelativeUnit::Hour),
    (7.0, RelativeUnit::Day),
    (4.34524, RelativeUnit::Week),
    (12.0, RelativeUnit::Month),
    (10.0, RelativeUnit::Year),
];

/// Round half towards positive infinity
#[allow(clippy::cast_possible_truncation)]
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Render `date` relative to `now`
///
/// Past dates read "… ago", future dates "in …". Anything beyond ten years
/// falls back to a medium date such as "Jan 5, 2014".
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_relative(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (date - now).num_milliseconds();
    if diff_ms.abs() < JUST_NOW_MS {
        return "just now".to_string();
    }

    let mut duration = diff_ms as f64 / 1000.0;
    for (amount, unit) in DIVISIONS {
        if duration.abs() < amount {
            return unit.phrase(round_half_up(duration));
        }
        duration /= amount;
    }

    format_medium_date(date)
}

/// Medium-style absolute date, e.g. "Jun 1, 2024"
#[must_use]
pub fn format_medium_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Parse a CMS timestamp
///
/// Accepts RFC 3339, a naive ISO date-time (read as UTC) or a bare date.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidTimestamp`] when no format matches.
pub fn parse_timestamp(value: &str) -> crate::Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(crate::Error::InvalidTimestamp {
        value: value.to_string(),
    })
}

/// First string value found under [`TIMESTAMP_KEYS`], in priority order
#[must_use]
pub fn extract_timestamp(record: &serde_json::Map<String, Value>) -> Option<&str> {
    TIMESTAMP_KEYS
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
}

/// Most recent parseable timestamp across `records`
///
/// Non-object records and unparseable values are skipped.
#[must_use]
pub fn latest_timestamp(records: &[Value]) -> Option<DateTime<Utc>> {
    records
        .iter()
        .filter_map(Value::as_object)
        .filter_map(extract_timestamp)
        .filter_map(|raw| parse_timestamp(raw).ok())
        .max()
}

/// Relative label for the most recent record, `None` without any valid timestamp
#[must_use]
pub fn extract_updated_label(records: &[Value], clock: &dyn Clock) -> Option<String> {
    latest_timestamp(records).map(|latest| format_relative(latest, clock.now()))
}
