//! Day-only UTC calendar semantics.
//!
//! Every comparison in this crate goes through the helpers below: timestamps
//! coming from the release store may carry arbitrary times of day, so two
//! values are equal when their UTC calendar dates are equal, never when their
//! raw instants are.
//!
//! ```text
//! 2026-02-01T00:00:00Z ─┐
//! 2026-02-01T17:30:12Z ─┼──► "2026-02-01"
//! 2026-02-01T23:59:59Z ─┘
//! ```

pub mod math;

use chrono::{DateTime, NaiveDate, Utc};

pub use math::{add_days, add_months, end_of_day, midnight, start_of_day, utc_date};

/// `YYYY-MM-DD` key of `d` in UTC.
///
/// Keys sort lexicographically in calendar order, so they can be compared
/// directly.
pub fn date_only_key(d: DateTime<Utc>) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// `true` iff the calendar date of `d` lies within `[start, end]`, both bounds
/// inclusive.  Returns `false` when either bound is absent.
pub fn closed_day_interval(
    d: DateTime<Utc>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> bool {
    let (Some(start), Some(end)) = (start, end) else {
        return false;
    };
    let day = date_only_key(d);
    date_only_key(start) <= day && day <= date_only_key(end)
}

/// Parse a user-supplied date, accepting either `YYYY-MM-DD` or a full
/// RFC 3339 timestamp.  The result is always normalised to UTC midnight.
pub fn parse_day(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(midnight(date));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| start_of_day(dt.with_timezone(&Utc)))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
