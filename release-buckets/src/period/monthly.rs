/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Calendar months.

use chrono::{DateTime, Utc};

use super::Period;
use crate::calendar::add_months;
use crate::calendar::math::{month_end, month_start};

/// One period per calendar month from the month containing `range_start`
/// through the month containing `range_end`, inclusive.
///
/// Named `"<MonthLong> <Year>"`, e.g. `"February 2028"`.
pub fn generate(range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> Vec<Period> {
    let last = month_start(range_end);
    let mut periods = Vec::new();
    let mut first = month_start(range_start);

    while first <= last {
        let name = first.format("%B %Y").to_string();
        periods.push(Period::new(name, first, month_end(first)));
        first = add_months(first, 1);
    }

    periods
}

// ── Tests ─────────────────────────────────────────────────────────────────────
