/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Monday–Sunday weeks.
//!
//! Each week is named after the month its Monday falls in, with a 1-based
//! week-of-month index counted from the first Monday on or after the 1st of
//! that month:
//!
//! ```text
//! December 2025:  Mon 1  Mon 8  Mon 15  Mon 22  Mon 29
//!                 wk 1   wk 2   wk 3    wk 4    wk 5   → "Dec week 5 2025"
//! ```

use chrono::{DateTime, Datelike, Utc};

use super::Period;
use crate::calendar::math::{month_start, monday_on_or_after, monday_on_or_before};
use crate::calendar::{add_days, end_of_day};

/// Weeks covering `range_start..=range_end`.
///
/// The first week starts on the Monday on or before `range_start`; generation
/// stops once a Monday falls after the last instant of `range_end`.
pub fn generate(range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> Vec<Period> {
    let limit = end_of_day(range_end);
    let mut periods = Vec::new();
    let mut monday = monday_on_or_before(range_start);

    while monday <= limit {
        let sunday = add_days(monday, 6);
        periods.push(Period::new(week_name(monday), monday, sunday));
        monday = add_days(monday, 7);
    }

    periods
}

/// 1-based position of `monday` among the Mondays of its month.
pub fn week_of_month(monday: DateTime<Utc>) -> u32 {
    let first_monday = monday_on_or_after(month_start(monday));
    let weeks = (monday.date_naive() - first_monday.date_naive()).num_days() / 7;
    // `monday` is itself a Monday of this month, so `weeks` is 0..=4
    u32::try_from(weeks).unwrap_or(0) + 1
}

/// `"<MonShort> week <N> <Year>"` for the week starting on `monday`.
pub fn week_name(monday: DateTime<Utc>) -> String {
    format!(
        "{} week {} {}",
        monday.format("%b"),
        week_of_month(monday),
        monday.year()
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{date_only_key, utc_date};
    use chrono::Weekday;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        utc_date(y, m, d).unwrap()
    }

    // ── Boundaries ────────────────────────────────────────────────────────────

    #[test]
    fn january_2026_yields_five_weeks() {
        let periods = generate(day(2026, 1, 1), day(2026, 1, 31));
        let starts: Vec<String> = periods.iter().map(|p| date_only_key(p.start)).collect();
        assert_eq!(
            starts,
            vec![
                "2025-12-29",
                "2026-01-05",
                "2026-01-12",
                "2026-01-19",
                "2026-01-26"
            ]
        );
        for p in &periods {
            assert_eq!(p.len_days(), 7, "{} is not 7 days", p.name);
            assert_eq!(p.start.weekday(), Weekday::Mon);
            assert_eq!(p.end.weekday(), Weekday::Sun);
        }
    }

    #[test]
    fn range_starting_on_sunday_begins_previous_monday() {
        // 2026-03-01 is a Sunday
        let periods = generate(day(2026, 3, 1), day(2026, 3, 1));
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start, day(2026, 2, 23));
        assert_eq!(periods[0].end, day(2026, 3, 1));
    }

    #[test]
    fn range_ending_on_monday_includes_that_week() {
        // 2026-01-12 is a Monday; its week must be generated
        let periods = generate(day(2026, 1, 5), day(2026, 1, 12));
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[1].start, day(2026, 1, 12));
    }

    // ── Naming ────────────────────────────────────────────────────────────────

    #[test]
    fn names_use_month_of_monday() {
        let periods = generate(day(2026, 1, 1), day(2026, 1, 31));
        let names: Vec<&str> = periods.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Dec week 5 2025",
                "Jan week 1 2026",
                "Jan week 2 2026",
                "Jan week 3 2026",
                "Jan week 4 2026"
            ]
        );
    }

    #[test]
    fn week_index_counts_from_first_monday_of_month() {
        // June 2026 starts on a Monday
        assert_eq!(week_of_month(day(2026, 6, 1)), 1);
        assert_eq!(week_of_month(day(2026, 6, 29)), 5);
        // August 2026: first Monday is the 3rd
        assert_eq!(week_of_month(day(2026, 8, 3)), 1);
        assert_eq!(week_of_month(day(2026, 8, 31)), 5);
    }
}
