/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Feature end date → release lookup.

use chrono::{DateTime, Utc};

use crate::calendar::closed_day_interval;
use crate::store::ReleaseRecord;

/// First release in `candidates` (in the order supplied) whose closed day
/// interval contains `end_date`.
///
/// `None` is a normal outcome meaning the catalog has no bucket for that day
/// yet.  Records missing either bound are never matched.
pub fn find_matching_release<'a>(
    end_date: DateTime<Utc>,
    candidates: &'a [ReleaseRecord],
) -> Option<&'a ReleaseRecord> {
    candidates
        .iter()
        .find(|r| closed_day_interval(end_date, r.start(), r.end()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::utc_date;
    use crate::store::Timeframe;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        utc_date(y, m, d).unwrap()
    }

    fn release(id: &str, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> ReleaseRecord {
        ReleaseRecord {
            id: id.to_string(),
            name: id.to_string(),
            group_id: "grp-monthly".to_string(),
            timeframe: Timeframe { start, end },
        }
    }

    fn monthly_catalog() -> Vec<ReleaseRecord> {
        vec![
            release("march", Some(day(2026, 3, 1)), Some(day(2026, 3, 31))),
            release("february", Some(day(2026, 2, 1)), Some(day(2026, 2, 28))),
            release("january", Some(day(2026, 1, 1)), Some(day(2026, 1, 31))),
        ]
    }

    #[test]
    fn matches_period_containing_end_date() {
        let catalog = monthly_catalog();
        let m = find_matching_release(day(2026, 2, 3), &catalog).unwrap();
        assert_eq!(m.id, "february");
    }

    #[test]
    fn boundaries_are_inclusive() {
        let catalog = monthly_catalog();
        assert_eq!(find_matching_release(day(2026, 2, 1), &catalog).unwrap().id, "february");
        assert_eq!(find_matching_release(day(2026, 2, 28), &catalog).unwrap().id, "february");
    }

    #[test]
    fn stored_times_of_day_do_not_shift_the_match() {
        // End bound stored at 23:59:59.999, start at noon; feature ends at 00:00
        let catalog = vec![release(
            "february",
            Some(Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap()),
            Some(crate::calendar::end_of_day(day(2026, 2, 28))),
        )];
        assert!(find_matching_release(day(2026, 2, 1), &catalog).is_some());
    }

    #[test]
    fn no_match_outside_catalog() {
        let catalog = monthly_catalog();
        assert!(find_matching_release(day(2026, 4, 1), &catalog).is_none());
        assert!(find_matching_release(day(2026, 2, 3), &[]).is_none());
    }

    #[test]
    fn records_without_bounds_are_skipped() {
        let catalog = vec![
            release("open-ended", Some(day(2026, 1, 1)), None),
            release("february", Some(day(2026, 2, 1)), Some(day(2026, 2, 28))),
        ];
        assert_eq!(find_matching_release(day(2026, 2, 3), &catalog).unwrap().id, "february");
    }

    #[test]
    fn first_match_wins_on_malformed_catalog() {
        let catalog = vec![
            release("wide", Some(day(2026, 1, 1)), Some(day(2026, 12, 31))),
            release("february", Some(day(2026, 2, 1)), Some(day(2026, 2, 28))),
        ];
        assert_eq!(find_matching_release(day(2026, 2, 3), &catalog).unwrap().id, "wide");
    }
}
