/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Three-month quarters aligned on a fiscal-year anchor month.
//!
//! With anchor `A`, a date in month `M` belongs to the quarter starting at
//! `A + 3 * floor(((M - A) mod 12) / 3)`.  The `Q` index counts from the
//! anchor (`Q1` starts in month `A`) while the year in the name is the
//! calendar year of the quarter's first day:
//!
//! ```text
//! anchor = 8 (August)
//!   2026-08-01 .. 2026-10-31   "Q1 2026"
//!   2026-11-01 .. 2027-01-31   "Q2 2026"
//!   2027-02-01 .. 2027-04-30   "Q3 2027"
//!   2027-05-01 .. 2027-07-31   "Q4 2027"
//! ```

use chrono::{DateTime, Datelike, Utc};

use super::{Period, QuarterAnchor};
use crate::calendar::math::month_start;
use crate::calendar::{add_days, add_months};

/// Whole months from the anchor month to `d`'s month, wrapped into `0..12`.
fn months_since_anchor(d: DateTime<Utc>, anchor: QuarterAnchor) -> u32 {
    // month0 and anchor-1 are both 0..=11, so the sum stays positive
    (d.month0() + 12 - (anchor.month() - 1)) % 12
}

/// First day of the quarter containing `d`.
pub fn quarter_start(d: DateTime<Utc>, anchor: QuarterAnchor) -> DateTime<Utc> {
    let into_quarter = months_since_anchor(d, anchor) % 3;
    // into_quarter is 0..=2
    add_months(month_start(d), -(into_quarter as i32))
}

/// `1..=4` index of the quarter starting at `start`.
pub fn quarter_number(start: DateTime<Utc>, anchor: QuarterAnchor) -> u32 {
    months_since_anchor(start, anchor) / 3 + 1
}

/// Quarters from the one containing `range_start` through the one containing
/// `range_end`, each exactly three months long.
pub fn generate(
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    anchor: QuarterAnchor,
) -> Vec<Period> {
    let last = quarter_start(range_end, anchor);
    let mut periods = Vec::new();
    let mut start = quarter_start(range_start, anchor);

    while start <= last {
        let next = add_months(start, 3);
        let name = format!("Q{} {}", quarter_number(start, anchor), start.year());
        periods.push(Period::new(name, start, add_days(next, -1)));
        start = next;
    }

    periods
}

// ── Tests ─────────────────────────────────────────────────────────────────────
