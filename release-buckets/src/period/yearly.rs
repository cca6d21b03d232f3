/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Calendar years.

use chrono::{DateTime, Datelike, Utc};

use super::Period;
use crate::calendar::utc_date;

/// One period per calendar year (Jan 1 – Dec 31) from the year of
/// `range_start` through the year of `range_end`.  Named `"<Year>"`.
pub fn generate(range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> Vec<Period> {
    (range_start.year()..=range_end.year())
        .filter_map(|year| {
            let start = utc_date(year, 1, 1)?;
            let end = utc_date(year, 12, 31)?;
            Some(Period::new(year.to_string(), start, end))
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
