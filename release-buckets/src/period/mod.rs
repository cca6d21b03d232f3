/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Calendar period generation.
//!
//! A [`Period`] is a named, closed day range (`start..=end`, both at UTC
//! midnight).  One generator per [`Granularity`] turns a requested date range
//! into the ordered, gap-free sequence of periods covering it:
//!
//! | Granularity | Boundaries | Name |
//! |---|---|---|
//! | `Weekly` | Monday–Sunday | `Jan week 2 2026` |
//! | `Monthly` | 1st – last day of month | `January 2026` |
//! | `Quarterly` | 3 months aligned on [`QuarterAnchor`] | `Q1 2026` |
//! | `Yearly` | Jan 1 – Dec 31 | `2026` |
//!
//! Generators are pure: no I/O, no clock, deterministic for a given
//! `(range_start, range_end, anchor)`.  Adjacent periods always satisfy
//! `next.start == prev.end + 1 day`.

pub mod monthly;
pub mod quarterly;
pub mod weekly;
pub mod yearly;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{add_days, closed_day_interval, date_only_key};

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors raised while building generator inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// A quarter anchor must name a calendar month.
    #[error("quarter anchor month {0} is outside 1..=12")]
    InvalidAnchorMonth(u32),

    /// A granularity name that none of the generators understand.
    #[error("unknown granularity '{0}' (valid: weekly, monthly, quarterly, yearly)")]
    UnknownGranularity(String),
}

// ── Granularity ───────────────────────────────────────────────────────────────

/// Release cadence.  Each granularity maps to its own release group and the
/// groups never share assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Granularity {
    /// Every granularity, finest first.
    pub const ALL: [Granularity; 4] = [
        Granularity::Weekly,
        Granularity::Monthly,
        Granularity::Quarterly,
        Granularity::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Quarterly => "quarterly",
            Granularity::Yearly => "yearly",
        }
    }

    /// Advisory unit label understood by the release store.
    ///
    /// The store has no week unit; weekly releases are tagged with `day`.
    pub fn store_label(self) -> &'static str {
        match self {
            Granularity::Weekly => "day",
            Granularity::Monthly => "month",
            Granularity::Quarterly => "quarter",
            Granularity::Yearly => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" => Ok(Granularity::Weekly),
            "monthly" | "month" => Ok(Granularity::Monthly),
            "quarterly" | "quarter" => Ok(Granularity::Quarterly),
            "yearly" | "year" => Ok(Granularity::Yearly),
            other => Err(PeriodError::UnknownGranularity(other.to_string())),
        }
    }
}

// ── QuarterAnchor ─────────────────────────────────────────────────────────────

/// First month (1–12) of the fiscal year that quarters are aligned on.
///
/// `QuarterAnchor::default()` is January, i.e. calendar quarters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct QuarterAnchor(u32);

impl QuarterAnchor {
    pub const JANUARY: QuarterAnchor = QuarterAnchor(1);

    /// # Errors
    /// [`PeriodError::InvalidAnchorMonth`] unless `month` is in `1..=12`.
    pub fn new(month: u32) -> Result<Self, PeriodError> {
        if (1..=12).contains(&month) {
            Ok(QuarterAnchor(month))
        } else {
            Err(PeriodError::InvalidAnchorMonth(month))
        }
    }

    pub fn month(self) -> u32 {
        self.0
    }
}

impl Default for QuarterAnchor {
    fn default() -> Self {
        QuarterAnchor::JANUARY
    }
}

impl TryFrom<u32> for QuarterAnchor {
    type Error = PeriodError;

    fn try_from(month: u32) -> Result<Self, Self::Error> {
        QuarterAnchor::new(month)
    }
}

impl From<QuarterAnchor> for u32 {
    fn from(anchor: QuarterAnchor) -> Self {
        anchor.0
    }
}

// ── Period ────────────────────────────────────────────────────────────────────

/// A named closed day range produced by a generator.
///
/// Never persisted directly – the seeder turns missing periods into release
/// records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    pub name: String,
    /// First day, UTC midnight.
    pub start: DateTime<Utc>,
    /// Last day (inclusive), UTC midnight.
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn new(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// `true` if the calendar date of `d` falls inside this period.
    pub fn contains(&self, d: DateTime<Utc>) -> bool {
        closed_day_interval(d, Some(self.start), Some(self.end))
    }

    /// `(start, end)` as `YYYY-MM-DD` keys – the identity used for idempotent
    /// seeding.
    pub fn day_keys(&self) -> (String, String) {
        (date_only_key(self.start), date_only_key(self.end))
    }

    /// Number of calendar days covered, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end.date_naive() - self.start.date_naive()).num_days() + 1
    }

    /// First day after this period ends.
    pub fn next_start(&self) -> DateTime<Utc> {
        add_days(self.end, 1)
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Generate the periods of `granularity` covering `range_start..=range_end`.
///
/// `anchor` only affects [`Granularity::Quarterly`].  An inverted range yields
/// an empty sequence.
pub fn generate(
    granularity: Granularity,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    anchor: QuarterAnchor,
) -> Vec<Period> {
    match granularity {
        Granularity::Weekly => weekly::generate(range_start, range_end),
        Granularity::Monthly => monthly::generate(range_start, range_end),
        Granularity::Quarterly => quarterly::generate(range_start, range_end, anchor),
        Granularity::Yearly => yearly::generate(range_start, range_end),
    }
}

/// Returns `true` if `periods` are ordered by start and each one begins the day
/// after its predecessor ends.
pub fn is_contiguous(periods: &[Period]) -> bool {
    periods
        .windows(2)
        .all(|w| w[0].start <= w[0].end && w[1].start == w[0].next_start())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
