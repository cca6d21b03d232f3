/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Release store port.
//!
//! The release catalog and the feature→release links live in an external
//! store.  The core only needs four operations, captured by the
//! [`ReleaseStore`] trait:
//!
//! ```text
//! Seeder ─────┬─► list_releases_for_group ─┐
//!             └─► create_release           ├──► ReleaseStore (remote / file / memory)
//! Reconciler ─┬─► list_releases_for_group  │
//!             └─► set_assignment ──────────┘
//! outer layer ──► get_feature
//! ```
//!
//! Adapters:
//! * [`memory::InMemoryReleaseStore`] – process-local catalog.
//! * [`file::FileReleaseStore`] – the same catalog persisted as YAML.

pub mod file;
pub mod memory;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::period::Granularity;

// ── Error type ────────────────────────────────────────────────────────────────

/// Failures reported by a [`ReleaseStore`] adapter.
///
/// | Variant | Treated as |
/// |---|---|
/// | `NotFound` / `Forbidden` | empty catalog when listing a group |
/// | `RateLimited` / `Unavailable` | transient – recorded per period / group |
/// | `Rejected` | the store refused the write (validation, conflict) |
/// | `Io` | local persistence failed |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{what} not found")]
    NotFound { what: String },

    #[error("access to group '{group_id}' denied")]
    Forbidden { group_id: String },

    #[error("rate limited by release store")]
    RateLimited,

    #[error("release store unavailable: {0}")]
    Unavailable(String),

    #[error("release store rejected the request: {0}")]
    Rejected(String),

    #[error("catalog persistence failed: {0}")]
    Io(String),
}

impl StoreError {
    /// `true` for the not-found / forbidden class, which callers degrade to an
    /// empty catalog instead of failing.
    pub fn is_missing_group(&self) -> bool {
        matches!(self, StoreError::NotFound { .. } | StoreError::Forbidden { .. })
    }
}

// ── Data model ────────────────────────────────────────────────────────────────

/// Start/end of a release.  Either bound may be absent on records created
/// outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timeframe {
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

/// A release bucket as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub id: String,
    pub name: String,
    pub group_id: String,
    #[serde(default)]
    pub timeframe: Timeframe,
}

impl ReleaseRecord {
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.timeframe.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.timeframe.end
    }
}

/// Creation request for a missing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    pub name: String,
    pub group_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub granularity: Granularity,
}

/// Read-only view of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    #[serde(default)]
    pub timeframe_end: Option<DateTime<Utc>>,
    /// Releases the feature is currently linked to, across all groups.
    #[serde(default)]
    pub release_ids: Vec<String>,
}

/// A feature → release link, scoped to one release group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub feature_id: String,
    pub release_id: String,
    pub group_id: String,
}

// ── Port ──────────────────────────────────────────────────────────────────────

/// Operations the seeding and reconciliation core needs from the external
/// catalog.
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// All releases in `group_id`.
    ///
    /// Adapters should return an empty list when the group does not exist or
    /// is not accessible, and an error for anything else.
    async fn list_releases_for_group(&self, group_id: &str)
        -> Result<Vec<ReleaseRecord>, StoreError>;

    /// Create a release in `release.group_id`.
    async fn create_release(&self, release: &NewRelease) -> Result<ReleaseRecord, StoreError>;

    /// Link (`assigned = true`) or unlink a feature and a release.
    ///
    /// Idempotent: linking twice or unlinking a missing link succeeds.
    async fn set_assignment(
        &self,
        feature_id: &str,
        release_id: &str,
        assigned: bool,
        group_id: &str,
    ) -> Result<(), StoreError>;

    /// Look a feature up by id.  `Ok(None)` when it does not exist.
    async fn get_feature(&self, feature_id: &str) -> Result<Option<Feature>, StoreError>;
}

/// List `group_id`, mapping the not-found / forbidden class to an empty
/// catalog so a missing group never looks like an outage.
pub async fn fetch_catalog(
    store: &dyn ReleaseStore,
    group_id: &str,
) -> Result<Vec<ReleaseRecord>, StoreError> {
    match store.list_releases_for_group(group_id).await {
        Err(e) if e.is_missing_group() => {
            debug!(group_id, error = %e, "group missing or inaccessible, using empty catalog");
            Ok(Vec::new())
        }
        other => other,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
