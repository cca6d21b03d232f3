/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Feature → release assignment reconciliation.
//!
//! For every granularity the [`Reconciler`] keeps exactly one link between a
//! feature and the release whose day range contains the feature's end date:
//!
//! 1. match the end date against the group's catalog,
//! 2. link the feature to the matched release,
//! 3. unlink every other release of the **same group** the feature still
//!    holds.
//!
//! Granularities are independent.  A missing group, an unreachable catalog, a
//! failed link or a missing bucket in one granularity never blocks the
//! others, and a stale link that cannot be removed is logged but does not undo
//! the primary assignment.
//!
//! Catalogs are fetched at most once per group per [`Reconciler::reconcile_feature`]
//! call through a [`CatalogCache`] owned by that call; separate calls never
//! share a cache.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::calendar::date_only_key;
use crate::config::BucketConfig;
use crate::event::FeatureChangeEvent;
use crate::matcher::find_matching_release;
use crate::period::Granularity;
use crate::store::{fetch_catalog, Feature, ReleaseRecord, ReleaseStore, StoreError};

// ── Outcome types ─────────────────────────────────────────────────────────────

/// Why a granularity was not reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The feature has no timeframe end.
    NoEndDate,
    /// No release group is configured for the granularity.
    GroupNotConfigured,
}

/// A stale link that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRemoval {
    pub release_id: String,
    pub error: String,
}

/// Result of reconciling one granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Assigned {
        release_id: String,
        release_name: String,
        /// Stale releases unlinked from the feature.
        removed: Vec<String>,
        removal_failures: Vec<FailedRemoval>,
    },
    /// No release covers the end date; the catalog needs seeding.
    NoMatch { end_date: String },
    Skipped { reason: SkipReason },
    CatalogUnavailable { error: String },
    AssignFailed { release_id: String, error: String },
}

/// [`ReconcileOutcome`] tagged with its granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GranularityOutcome {
    pub granularity: Granularity,
    pub group_id: Option<String>,
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
}

/// Machine-readable summary of one feature's reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureReport {
    pub feature_id: String,
    pub end_date: Option<String>,
    pub outcomes: Vec<GranularityOutcome>,
}

impl FeatureReport {
    pub fn outcome(&self, granularity: Granularity) -> Option<&ReconcileOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.granularity == granularity)
            .map(|o| &o.outcome)
    }

    pub fn assigned_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, ReconcileOutcome::Assigned { .. }))
            .count()
    }
}

/// What happened to an incoming feature-change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum EventDisposition {
    /// The event did not touch the temporal field.
    Ignored,
    FeatureNotFound { feature_id: String },
    Reconciled(FeatureReport),
}

// ── CatalogCache ──────────────────────────────────────────────────────────────

/// Group catalogs fetched during one reconciliation run.
///
/// Failures are cached too, so an unreachable group is tried once per run.
#[derive(Debug, Default)]
pub struct CatalogCache {
    entries: HashMap<String, Result<Vec<ReleaseRecord>, StoreError>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog for `group_id`, fetching it on first use.
    pub async fn get(
        &mut self,
        store: &dyn ReleaseStore,
        group_id: &str,
    ) -> Result<&[ReleaseRecord], StoreError> {
        if !self.entries.contains_key(group_id) {
            let fetched = fetch_catalog(store, group_id).await;
            self.entries.insert(group_id.to_string(), fetched);
        }
        match self.entries.get(group_id) {
            Some(Ok(records)) => Ok(records.as_slice()),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(&[]),
        }
    }

    /// Number of groups fetched so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Reconciler ────────────────────────────────────────────────────────────────

/// Enforces one release per granularity per feature.
pub struct Reconciler {
    store: Arc<dyn ReleaseStore>,
    config: Arc<BucketConfig>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn ReleaseStore>, config: Arc<BucketConfig>) -> Self {
        Self { store, config }
    }

    /// Reconcile `feature` against one group's `catalog`.
    ///
    /// Links the matching release, then unlinks every other release of the
    /// same catalog the feature still holds.
    pub async fn reconcile(
        &self,
        feature: &Feature,
        granularity: Granularity,
        group_id: &str,
        catalog: &[ReleaseRecord],
    ) -> ReconcileOutcome {
        let Some(end) = feature.timeframe_end else {
            info!(
                feature_id = %feature.id,
                granularity = %granularity,
                "Feature has no end date, skipping"
            );
            return ReconcileOutcome::Skipped {
                reason: SkipReason::NoEndDate,
            };
        };

        let Some(release) = find_matching_release(end, catalog) else {
            warn!(
                feature_id = %feature.id,
                granularity = %granularity,
                group_id,
                end_date = %date_only_key(end),
                catalog_size = catalog.len(),
                "No release covers the feature end date – catalog needs seeding"
            );
            return ReconcileOutcome::NoMatch {
                end_date: date_only_key(end),
            };
        };

        if let Err(e) = self
            .store
            .set_assignment(&feature.id, &release.id, true, group_id)
            .await
        {
            error!(
                feature_id = %feature.id,
                granularity = %granularity,
                release_id = %release.id,
                error = %e,
                "✗ failed to assign release"
            );
            return ReconcileOutcome::AssignFailed {
                release_id: release.id.clone(),
                error: e.to_string(),
            };
        }

        info!(
            feature_id = %feature.id,
            granularity = %granularity,
            release_id = %release.id,
            release = %release.name,
            "✓ assigned"
        );

        let stale = self.stale_links(feature, granularity, &release.id, catalog).await;

        let mut removed = Vec::new();
        let mut removal_failures = Vec::new();
        for release_id in stale {
            match self
                .store
                .set_assignment(&feature.id, release_id, false, group_id)
                .await
            {
                Ok(()) => {
                    debug!(feature_id = %feature.id, release_id, "stale assignment removed");
                    removed.push(release_id.to_string());
                }
                Err(e) => {
                    warn!(
                        feature_id = %feature.id,
                        granularity = %granularity,
                        release_id,
                        error = %e,
                        "Failed to remove stale assignment"
                    );
                    removal_failures.push(FailedRemoval {
                        release_id: release_id.to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        ReconcileOutcome::Assigned {
            release_id: release.id.clone(),
            release_name: release.name.clone(),
            removed,
            removal_failures,
        }
    }

    /// Releases of `catalog` other than `keep` that the feature may still be
    /// linked to.
    ///
    /// The links the store currently reports for the feature are merged with
    /// those carried on `feature`.  When the store cannot report the feature,
    /// every other release of the catalog counts as possibly linked.
    async fn stale_links<'c>(
        &self,
        feature: &Feature,
        granularity: Granularity,
        keep: &str,
        catalog: &'c [ReleaseRecord],
    ) -> Vec<&'c str> {
        let held: Option<HashSet<String>> = match self.store.get_feature(&feature.id).await {
            Ok(Some(current)) => Some(
                current
                    .release_ids
                    .into_iter()
                    .chain(feature.release_ids.iter().cloned())
                    .collect(),
            ),
            Ok(None) => {
                debug!(
                    feature_id = %feature.id,
                    granularity = %granularity,
                    "feature unknown to the store, unlinking every other release of the group"
                );
                None
            }
            Err(e) => {
                warn!(
                    feature_id = %feature.id,
                    granularity = %granularity,
                    error = %e,
                    "Cannot read current links, unlinking every other release of the group"
                );
                None
            }
        };

        catalog
            .iter()
            .map(|r| r.id.as_str())
            .filter(|id| *id != keep)
            .filter(|id| held.as_ref().map_or(true, |held| held.contains(*id)))
            .collect()
    }

    /// Reconcile every granularity for `feature`.
    pub async fn reconcile_feature(&self, feature: &Feature) -> FeatureReport {
        let mut cache = CatalogCache::new();
        let mut outcomes = Vec::with_capacity(Granularity::ALL.len());

        if feature.timeframe_end.is_none() {
            info!(feature_id = %feature.id, "Feature has no end date, nothing to reconcile");
        }

        for granularity in Granularity::ALL {
            let group_id = self.config.groups.get(granularity);
            let outcome = match group_id {
                _ if feature.timeframe_end.is_none() => ReconcileOutcome::Skipped {
                    reason: SkipReason::NoEndDate,
                },
                None => {
                    warn!(granularity = %granularity, "No release group configured, skipping");
                    ReconcileOutcome::Skipped {
                        reason: SkipReason::GroupNotConfigured,
                    }
                }
                Some(group_id) => match cache.get(self.store.as_ref(), group_id).await {
                    Ok(catalog) => self.reconcile(feature, granularity, group_id, catalog).await,
                    Err(e) => {
                        warn!(
                            feature_id = %feature.id,
                            granularity = %granularity,
                            group_id,
                            error = %e,
                            "Release catalog unavailable, skipping granularity"
                        );
                        ReconcileOutcome::CatalogUnavailable {
                            error: e.to_string(),
                        }
                    }
                },
            };
            outcomes.push(GranularityOutcome {
                granularity,
                group_id: group_id.map(str::to_string),
                outcome,
            });
        }

        let report = FeatureReport {
            feature_id: feature.id.clone(),
            end_date: feature.timeframe_end.map(date_only_key),
            outcomes,
        };

        info!(
            feature_id = %report.feature_id,
            assigned = report.assigned_count(),
            catalogs_fetched = cache.len(),
            "Reconciliation complete"
        );

        report
    }

    /// Entry point for feature-change events.
    ///
    /// Events that do not touch the configured temporal field are ignored so
    /// the assignment writes made here cannot re-trigger reconciliation.
    ///
    /// # Errors
    /// Propagates a [`StoreError`] if the feature lookup itself fails.
    pub async fn handle_event(
        &self,
        event: &FeatureChangeEvent,
    ) -> Result<EventDisposition, StoreError> {
        if !event.touches(&self.config.temporal_field) {
            debug!(
                feature_id = %event.feature_id,
                changed = ?event.changed_fields,
                temporal_field = %self.config.temporal_field,
                "event does not change the timeframe, ignoring"
            );
            return Ok(EventDisposition::Ignored);
        }

        let feature = match &event.feature {
            Some(f) => f.clone(),
            None => match self.store.get_feature(&event.feature_id).await? {
                Some(f) => f,
                None => {
                    warn!(feature_id = %event.feature_id, "Feature not found");
                    return Ok(EventDisposition::FeatureNotFound {
                        feature_id: event.feature_id.clone(),
                    });
                }
            },
        };

        Ok(EventDisposition::Reconciled(
            self.reconcile_feature(&feature).await,
        ))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
