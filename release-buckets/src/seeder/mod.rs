//! Release catalog seeding.
//!
//! [`Seeder`] keeps each release group populated ahead of need: it generates
//! the periods covering `today ..= today + horizon` and creates whichever of
//! them the group's catalog does not already hold.
//!
//! ```text
//!            ┌── list weekly ───┐
//! seed_all ──┼── list monthly ──┼── (concurrent) ──► seed weekly ─► seed monthly ─► …
//!            ├── list quarterly ┤                      (sequential, one create at a time)
//!            └── list yearly ───┘
//! ```
//!
//! # Failure isolation
//!
//! | Failure | Effect |
//! |---|---|
//! | one period's `create_release` fails | recorded in `failed`, remaining periods still attempted |
//! | one group's catalog fetch fails | that group is `failed`, other groups still seeded |
//! | group missing / forbidden | treated as an empty catalog, every period is created |
//! | every configured group's fetch fails | [`SeedError::AllGroupsUnavailable`] |
//!
//! # Idempotence
//! A period exists when some record in the group has the same `(start, end)`
//! day keys.  Re-running seeding over a populated catalog creates nothing.
//! Two overlapping seeding runs may both create the same missing period; no
//! locking is attempted.

pub mod error;

pub use error::{GroupFetchFailure, SeedError};

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::calendar::{add_months, date_only_key, start_of_day};
use crate::config::BucketConfig;
use crate::period::{self, Granularity, Period};
use crate::store::{fetch_catalog, NewRelease, ReleaseRecord, ReleaseStore, StoreError};

// ── Report types ──────────────────────────────────────────────────────────────

/// Outcome class for one group or for a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStatus {
    Success,
    PartialSuccess,
    Failed,
    /// No group id configured for this granularity.
    Skipped,
}

/// A period whose creation failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPeriod {
    pub name: String,
    pub error: String,
}

/// Result of seeding one group from an already-fetched catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    /// Records created, in creation order (furthest future first).
    pub created: Vec<ReleaseRecord>,
    pub failed: Vec<FailedPeriod>,
    /// Periods already present in the catalog.
    pub already_present: usize,
}

impl SeedResult {
    /// `Failed` only when no period of the horizon exists after the run.
    pub fn status(&self) -> SeedStatus {
        if self.failed.is_empty() {
            SeedStatus::Success
        } else if self.created.is_empty() && self.already_present == 0 {
            SeedStatus::Failed
        } else {
            SeedStatus::PartialSuccess
        }
    }
}

/// Per-group section of a [`SeedSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSeedReport {
    pub granularity: Granularity,
    pub group_id: Option<String>,
    pub status: SeedStatus,
    /// Records in the group before seeding.
    pub existing: usize,
    /// Periods generated for the horizon.
    pub generated: usize,
    #[serde(flatten)]
    pub result: SeedResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

/// Machine-readable summary of a [`Seeder::seed_all`] run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub status: SeedStatus,
    pub today: DateTime<Utc>,
    pub groups: Vec<GroupSeedReport>,
}

impl SeedSummary {
    pub fn total_created(&self) -> usize {
        self.groups.iter().map(|g| g.result.created.len()).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.groups.iter().map(|g| g.result.failed.len()).sum()
    }

    pub fn group(&self, granularity: Granularity) -> Option<&GroupSeedReport> {
        self.groups.iter().find(|g| g.granularity == granularity)
    }
}

/// Catalog fetch result for one granularity.
enum Fetched {
    Unconfigured,
    Catalog {
        group_id: String,
        records: Vec<ReleaseRecord>,
    },
    Failed {
        group_id: String,
        error: StoreError,
    },
}

// ── Seeder ────────────────────────────────────────────────────────────────────

/// Creates missing release records for every configured granularity.
///
/// Holds shared handles to the store and configuration only; every run's
/// state is local to the call.
pub struct Seeder {
    store: Arc<dyn ReleaseStore>,
    config: Arc<BucketConfig>,
}

impl Seeder {
    pub fn new(store: Arc<dyn ReleaseStore>, config: Arc<BucketConfig>) -> Self {
        Self { store, config }
    }

    /// Periods to seed for `granularity` when run at `now`:
    /// `start_of_day(now) ..= start_of_day(now) + horizon`.
    pub fn periods_for(&self, granularity: Granularity, now: DateTime<Utc>) -> Vec<Period> {
        let today = start_of_day(now);
        let months = self.config.horizons.months(granularity);
        let horizon_end = add_months(today, i32::try_from(months).unwrap_or(i32::MAX));
        period::generate(granularity, today, horizon_end, self.config.quarter_anchor)
    }

    /// Create every period of `periods` that `existing` does not already hold.
    ///
    /// Missing periods are created one at a time, furthest future first.  A
    /// failed creation is recorded and the loop moves on.
    pub async fn seed(
        &self,
        granularity: Granularity,
        group_id: &str,
        periods: &[Period],
        existing: &[ReleaseRecord],
    ) -> SeedResult {
        let present: HashSet<(String, String)> = existing
            .iter()
            .filter_map(|r| Some((date_only_key(r.start()?), date_only_key(r.end()?))))
            .collect();

        let (already, missing): (Vec<&Period>, Vec<&Period>) = periods
            .iter()
            .partition(|p| present.contains(&p.day_keys()));

        for p in &already {
            debug!(granularity = %granularity, name = %p.name, "  already present");
        }

        let mut result = SeedResult {
            already_present: already.len(),
            ..SeedResult::default()
        };

        if missing.is_empty() {
            info!(
                granularity = %granularity,
                group_id,
                "All {} period(s) already present",
                periods.len()
            );
            return result;
        }

        info!(
            granularity = %granularity,
            group_id,
            missing = missing.len(),
            present = result.already_present,
            "Creating missing releases"
        );

        for p in missing.into_iter().rev() {
            let request = NewRelease {
                name: p.name.clone(),
                group_id: group_id.to_string(),
                start: p.start,
                end: p.end,
                granularity,
            };
            match self.store.create_release(&request).await {
                Ok(record) => {
                    info!(
                        granularity = %granularity,
                        id = %record.id,
                        name = %record.name,
                        start = %date_only_key(p.start),
                        end = %date_only_key(p.end),
                        "✓ created"
                    );
                    result.created.push(record);
                }
                Err(e) => {
                    error!(
                        granularity = %granularity,
                        name = %p.name,
                        error = %e,
                        "✗ failed to create release"
                    );
                    result.failed.push(FailedPeriod {
                        name: p.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        result
    }

    /// Seed every configured granularity as of `now`.
    ///
    /// All four catalogs are fetched concurrently, then the groups are seeded
    /// one after another.
    ///
    /// # Errors
    /// [`SeedError::AllGroupsUnavailable`] when at least one group is
    /// configured and every configured group's fetch failed.  Any lesser
    /// failure is reported inside the returned [`SeedSummary`].
    pub async fn seed_all(&self, now: DateTime<Utc>) -> Result<SeedSummary, SeedError> {
        let today = start_of_day(now);
        info!(today = %date_only_key(today), "=== Seeding release catalog ===");

        let (weekly, monthly, quarterly, yearly) = tokio::join!(
            self.fetch(Granularity::Weekly),
            self.fetch(Granularity::Monthly),
            self.fetch(Granularity::Quarterly),
            self.fetch(Granularity::Yearly),
        );

        let fetched = [
            (Granularity::Weekly, weekly),
            (Granularity::Monthly, monthly),
            (Granularity::Quarterly, quarterly),
            (Granularity::Yearly, yearly),
        ];

        let fetch_failures: Vec<GroupFetchFailure> = fetched
            .iter()
            .filter_map(|(granularity, f)| match f {
                Fetched::Failed { group_id, error } => Some(GroupFetchFailure {
                    granularity: *granularity,
                    group_id: group_id.clone(),
                    error: error.clone(),
                }),
                _ => None,
            })
            .collect();
        let configured = fetched
            .iter()
            .filter(|(_, f)| !matches!(f, Fetched::Unconfigured))
            .count();

        if configured > 0 && fetch_failures.len() == configured {
            error!(groups = configured, "Every release group is unavailable, nothing seeded");
            return Err(SeedError::AllGroupsUnavailable {
                failures: fetch_failures,
            });
        }

        let mut groups = Vec::with_capacity(fetched.len());
        for (granularity, f) in fetched {
            let report = match f {
                Fetched::Unconfigured => GroupSeedReport {
                    granularity,
                    group_id: None,
                    status: SeedStatus::Skipped,
                    existing: 0,
                    generated: 0,
                    result: SeedResult::default(),
                    fetch_error: None,
                },
                Fetched::Failed { group_id, error } => GroupSeedReport {
                    granularity,
                    group_id: Some(group_id),
                    status: SeedStatus::Failed,
                    existing: 0,
                    generated: 0,
                    result: SeedResult::default(),
                    fetch_error: Some(error.to_string()),
                },
                Fetched::Catalog { group_id, records } => {
                    let periods = self.periods_for(granularity, today);
                    let result = self.seed(granularity, &group_id, &periods, &records).await;
                    GroupSeedReport {
                        granularity,
                        status: result.status(),
                        group_id: Some(group_id),
                        existing: records.len(),
                        generated: periods.len(),
                        result,
                        fetch_error: None,
                    }
                }
            };
            groups.push(report);
        }

        let status = overall_status(&groups);
        let summary = SeedSummary {
            status,
            today,
            groups,
        };

        info!(
            status = ?summary.status,
            created = summary.total_created(),
            failed = summary.total_failed(),
            "=== Seeding complete ==="
        );

        Ok(summary)
    }

    async fn fetch(&self, granularity: Granularity) -> Fetched {
        let Some(group_id) = self.config.groups.get(granularity) else {
            warn!(granularity = %granularity, "No release group configured, skipping");
            return Fetched::Unconfigured;
        };

        match fetch_catalog(self.store.as_ref(), group_id).await {
            Ok(records) => {
                debug!(
                    granularity = %granularity,
                    group_id,
                    records = records.len(),
                    "catalog fetched"
                );
                Fetched::Catalog {
                    group_id: group_id.to_string(),
                    records,
                }
            }
            Err(error) => {
                warn!(
                    granularity = %granularity,
                    group_id,
                    error = %error,
                    "Failed to fetch release catalog"
                );
                Fetched::Failed {
                    group_id: group_id.to_string(),
                    error,
                }
            }
        }
    }
}

/// `success` when every non-skipped group succeeded, `failed` when every one
/// failed, `partial_success` otherwise.
fn overall_status(groups: &[GroupSeedReport]) -> SeedStatus {
    let statuses: Vec<SeedStatus> = groups
        .iter()
        .map(|g| g.status)
        .filter(|s| *s != SeedStatus::Skipped)
        .collect();

    if statuses.iter().all(|s| *s == SeedStatus::Success) {
        SeedStatus::Success
    } else if statuses.iter().all(|s| *s == SeedStatus::Failed) {
        SeedStatus::Failed
    } else {
        SeedStatus::PartialSuccess
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
