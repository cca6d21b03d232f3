/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pure UTC date arithmetic helpers.
//!
//! These are free functions rather than methods so they can be used and tested
//! independently of the period generators.  Every function works on
//! `DateTime<Utc>` and returns values normalised to UTC midnight unless noted.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// UTC midnight of `d`'s calendar date.
pub fn start_of_day(d: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&d.date_naive().and_time(NaiveTime::MIN))
}

/// `23:59:59.999` UTC of `d`'s calendar date.
pub fn end_of_day(d: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(d) + TimeDelta::milliseconds(MILLIS_PER_DAY - 1)
}

/// UTC midnight of a calendar date.
pub fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// UTC midnight of `year-month-day`, or `None` for an impossible date.
pub fn utc_date(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day).map(midnight)
}

/// Shift `d` by `days` calendar days (negative moves backwards).
///
/// Saturates at the chrono representable range instead of panicking.
pub fn add_days(d: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        d.checked_add_days(magnitude)
    } else {
        d.checked_sub_days(magnitude)
    };
    shifted.unwrap_or(if days >= 0 {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    })
}

/// Shift `d` by `months` calendar months.
///
/// Day-of-month is clamped to the target month's length (Jan 31 + 1 month =
/// Feb 28/29).  The generators only ever call this on the 1st of a month, so
/// clamping never kicks in there.
pub fn add_months(d: DateTime<Utc>, months: i32) -> DateTime<Utc> {
    let magnitude = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        d.checked_add_months(magnitude)
    } else {
        d.checked_sub_months(magnitude)
    };
    shifted.unwrap_or(if months >= 0 {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    })
}

/// UTC midnight on the 1st of `d`'s month.
pub fn month_start(d: DateTime<Utc>) -> DateTime<Utc> {
    let date = d.date_naive();
    // Day 1 exists in every month
    let first = date.with_day(1).unwrap_or(date);
    midnight(first)
}

/// Last calendar day of `d`'s month, at UTC midnight.
///
/// Computed as next month's 1st minus one day, which handles month length and
/// leap years without a lookup table.
pub fn month_end(d: DateTime<Utc>) -> DateTime<Utc> {
    add_days(add_months(month_start(d), 1), -1)
}

/// Months since year 0 for `d` (`year * 12 + month0`).
///
/// A flat month counter makes quarter alignment a simple modular operation.
pub fn month_index(d: DateTime<Utc>) -> i64 {
    i64::from(d.year()) * 12 + i64::from(d.month0())
}

/// Days to step back from `d` to reach the Monday on or before it.
///
/// Sunday counts as offset 6 (the end of the Monday–Sunday week).
pub fn days_since_monday(d: DateTime<Utc>) -> i64 {
    i64::from(d.weekday().num_days_from_monday())
}

/// Monday on or before `d`, at UTC midnight.
pub fn monday_on_or_before(d: DateTime<Utc>) -> DateTime<Utc> {
    add_days(start_of_day(d), -days_since_monday(d))
}

/// Monday on or after `d`, at UTC midnight.
pub fn monday_on_or_after(d: DateTime<Utc>) -> DateTime<Utc> {
    let back = days_since_monday(d);
    if back == 0 {
        start_of_day(d)
    } else {
        add_days(start_of_day(d), 7 - back)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        utc_date(y, m, d).unwrap()
    }

    // ── start_of_day / end_of_day ─────────────────────────────────────────────

    #[test]
    fn start_of_day_drops_time() {
        assert_eq!(start_of_day(at(2026, 3, 14, 17, 45)), day(2026, 3, 14));
    }

    #[test]
    fn start_of_day_is_idempotent() {
        let d = day(2026, 3, 14);
        assert_eq!(start_of_day(d), d);
    }

    #[test]
    fn end_of_day_is_last_millisecond() {
        let e = end_of_day(at(2026, 3, 14, 0, 5));
        assert_eq!(e.date_naive(), day(2026, 3, 14).date_naive());
        assert_eq!((e.hour(), e.minute(), e.second()), (23, 59, 59));
        assert_eq!(e.timestamp_subsec_millis(), 999);
    }

    // ── add_days / add_months ─────────────────────────────────────────────────

    #[test]
    fn add_days_crosses_year_boundary() {
        assert_eq!(add_days(day(2025, 12, 29), 6), day(2026, 1, 4));
        assert_eq!(add_days(day(2026, 1, 1), -1), day(2025, 12, 31));
    }

    #[test]
    fn add_months_from_first_of_month() {
        assert_eq!(add_months(day(2026, 11, 1), 3), day(2027, 2, 1));
        assert_eq!(add_months(day(2026, 2, 1), -2), day(2025, 12, 1));
    }

    #[test]
    fn add_months_clamps_day_of_month() {
        assert_eq!(add_months(day(2024, 1, 31), 1), day(2024, 2, 29));
    }

    // ── month helpers ─────────────────────────────────────────────────────────

    #[test]
    fn month_end_handles_leap_february() {
        assert_eq!(month_end(day(2024, 2, 10)), day(2024, 2, 29));
        assert_eq!(month_end(day(2026, 2, 10)), day(2026, 2, 28));
        assert_eq!(month_end(day(2026, 12, 3)), day(2026, 12, 31));
    }

    #[test]
    fn month_index_is_contiguous_across_years() {
        assert_eq!(month_index(day(2026, 1, 1)) - month_index(day(2025, 12, 1)), 1);
    }

    // ── Monday alignment ──────────────────────────────────────────────────────

    #[test]
    fn monday_on_or_before_treats_sunday_as_week_end() {
        // 2026-01-04 is a Sunday
        assert_eq!(monday_on_or_before(day(2026, 1, 4)), day(2025, 12, 29));
        // 2026-01-05 is a Monday
        assert_eq!(monday_on_or_before(day(2026, 1, 5)), day(2026, 1, 5));
    }

    #[test]
    fn monday_on_or_after_skips_forward() {
        assert_eq!(monday_on_or_after(day(2026, 1, 1)), day(2026, 1, 5));
        assert_eq!(monday_on_or_after(day(2025, 12, 1)), day(2025, 12, 1));
    }
}
