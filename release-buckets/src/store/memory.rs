/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Process-local release store.
//!
//! [`CatalogState`] is the plain data (serialisable, so the file adapter can
//! persist it verbatim); [`InMemoryReleaseStore`] wraps it in an async mutex
//! and implements [`ReleaseStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::{Assignment, Feature, NewRelease, ReleaseRecord, ReleaseStore, StoreError, Timeframe};

// ── CatalogState ──────────────────────────────────────────────────────────────

/// Stored shape of a feature.  Links are kept separately in
/// [`CatalogState::assignments`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub id: String,
    #[serde(default)]
    pub timeframe_end: Option<DateTime<Utc>>,
}

/// Full catalog contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogState {
    #[serde(default)]
    pub releases: Vec<ReleaseRecord>,
    #[serde(default)]
    pub features: Vec<FeatureEntry>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl CatalogState {
    pub fn releases_for_group(&self, group_id: &str) -> Vec<ReleaseRecord> {
        self.releases
            .iter()
            .filter(|r| r.group_id == group_id)
            .cloned()
            .collect()
    }

    /// Next free `rel-<n>` identifier.
    fn next_release_id(&self) -> String {
        let highest = self
            .releases
            .iter()
            .filter_map(|r| r.id.strip_prefix("rel-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        format!("rel-{}", highest + 1)
    }

    pub fn create_release(&mut self, release: &NewRelease) -> ReleaseRecord {
        let record = ReleaseRecord {
            id: self.next_release_id(),
            name: release.name.clone(),
            group_id: release.group_id.clone(),
            timeframe: Timeframe {
                start: Some(release.start),
                end: Some(release.end),
            },
        };
        debug!(
            id = %record.id,
            name = %record.name,
            group_id = %record.group_id,
            unit = release.granularity.store_label(),
            "release created"
        );
        self.releases.push(record.clone());
        record
    }

    /// # Errors
    /// [`StoreError::NotFound`] when linking to a release that does not exist
    /// in `group_id`.  Unlinking never fails.
    pub fn set_assignment(
        &mut self,
        feature_id: &str,
        release_id: &str,
        assigned: bool,
        group_id: &str,
    ) -> Result<(), StoreError> {
        let link = Assignment {
            feature_id: feature_id.to_string(),
            release_id: release_id.to_string(),
            group_id: group_id.to_string(),
        };

        if !assigned {
            self.assignments.retain(|a| a != &link);
            return Ok(());
        }

        let exists = self
            .releases
            .iter()
            .any(|r| r.id == release_id && r.group_id == group_id);
        if !exists {
            return Err(StoreError::NotFound {
                what: format!("release '{release_id}' in group '{group_id}'"),
            });
        }
        if !self.assignments.contains(&link) {
            self.assignments.push(link);
        }
        Ok(())
    }

    pub fn upsert_feature(&mut self, id: &str, timeframe_end: Option<DateTime<Utc>>) {
        match self.features.iter_mut().find(|f| f.id == id) {
            Some(f) => f.timeframe_end = timeframe_end,
            None => self.features.push(FeatureEntry {
                id: id.to_string(),
                timeframe_end,
            }),
        }
    }

    /// The feature with its current links filled in.
    pub fn feature(&self, id: &str) -> Option<Feature> {
        let entry = self.features.iter().find(|f| f.id == id)?;
        let release_ids = self
            .assignments
            .iter()
            .filter(|a| a.feature_id == id)
            .map(|a| a.release_id.clone())
            .collect();
        Some(Feature {
            id: entry.id.clone(),
            timeframe_end: entry.timeframe_end,
            release_ids,
        })
    }

    /// Links held by `feature_id` within `group_id`.
    pub fn assignments_in_group(&self, feature_id: &str, group_id: &str) -> Vec<String> {
        self.assignments
            .iter()
            .filter(|a| a.feature_id == feature_id && a.group_id == group_id)
            .map(|a| a.release_id.clone())
            .collect()
    }
}

// ── InMemoryReleaseStore ──────────────────────────────────────────────────────

/// [`ReleaseStore`] over a [`CatalogState`] held in memory.
///
/// Unknown groups list as empty, matching the remote store contract.
#[derive(Debug, Default)]
pub struct InMemoryReleaseStore {
    state: Mutex<CatalogState>,
}

impl InMemoryReleaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current catalog.
    pub async fn snapshot(&self) -> CatalogState {
        self.state.lock().await.clone()
    }

    pub async fn upsert_feature(&self, id: &str, timeframe_end: Option<DateTime<Utc>>) {
        self.state.lock().await.upsert_feature(id, timeframe_end);
    }

    /// Link without going through the reconciler (fixtures, imports).
    pub async fn link(
        &self,
        feature_id: &str,
        release_id: &str,
        group_id: &str,
    ) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .set_assignment(feature_id, release_id, true, group_id)
    }

    pub async fn assignments_in_group(&self, feature_id: &str, group_id: &str) -> Vec<String> {
        self.state
            .lock()
            .await
            .assignments_in_group(feature_id, group_id)
    }
}

#[async_trait]
impl ReleaseStore for InMemoryReleaseStore {
    async fn list_releases_for_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<ReleaseRecord>, StoreError> {
        Ok(self.state.lock().await.releases_for_group(group_id))
    }

    async fn create_release(&self, release: &NewRelease) -> Result<ReleaseRecord, StoreError> {
        Ok(self.state.lock().await.create_release(release))
    }

    async fn set_assignment(
        &self,
        feature_id: &str,
        release_id: &str,
        assigned: bool,
        group_id: &str,
    ) -> Result<(), StoreError> {
        self.state
            .lock()
            .await
            .set_assignment(feature_id, release_id, assigned, group_id)
    }

    async fn get_feature(&self, feature_id: &str) -> Result<Option<Feature>, StoreError> {
        Ok(self.state.lock().await.feature(feature_id))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
