/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! YAML-backed release store.
//!
//! The whole catalog lives in one file and is rewritten after every mutation:
//!
//! ```yaml
//! releases:
//!   - id: rel-1
//!     name: February 2026
//!     group_id: grp-monthly
//!     timeframe:
//!       start: 2026-02-01T00:00:00Z
//!       end: 2026-02-28T00:00:00Z
//! features:
//!   - id: F-1
//!     timeframe_end: 2026-02-03T00:00:00Z
//! assignments:
//!   - feature_id: F-1
//!     release_id: rel-1
//!     group_id: grp-monthly
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::memory::CatalogState;
use super::{Feature, NewRelease, ReleaseRecord, ReleaseStore, StoreError};

/// [`ReleaseStore`] persisted to a YAML file.
#[derive(Debug)]
pub struct FileReleaseStore {
    path: PathBuf,
    state: Mutex<CatalogState>,
}

impl FileReleaseStore {
    /// Load the catalog at `path`.  A missing file starts an empty catalog that
    /// is created on the first write.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self> {
        let state = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot open catalog file: {}", path.display()))?;
            let state: CatalogState = if content.trim().is_empty() {
                CatalogState::default()
            } else {
                serde_yaml::from_str(&content)
                    .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?
            };
            info!(
                path = %path.display(),
                releases = state.releases.len(),
                features = state.features.len(),
                assignments = state.assignments.len(),
                "Loaded release catalog"
            );
            state
        } else {
            warn!(
                path = %path.display(),
                "Catalog file does not exist, starting with an empty catalog"
            );
            CatalogState::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current catalog.
    pub async fn snapshot(&self) -> CatalogState {
        self.state.lock().await.clone()
    }

    /// Write `state` to disk.  Called with the state lock held so concurrent
    /// mutations are persisted in order.
    async fn persist(&self, state: &CatalogState) -> Result<(), StoreError> {
        let yaml = serde_yaml::to_string(state).map_err(|e| StoreError::Io(e.to_string()))?;
        tokio::fs::write(&self.path, yaml)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), "catalog persisted");
        Ok(())
    }
}

#[async_trait]
impl ReleaseStore for FileReleaseStore {
    async fn list_releases_for_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<ReleaseRecord>, StoreError> {
        Ok(self.state.lock().await.releases_for_group(group_id))
    }

    async fn create_release(&self, release: &NewRelease) -> Result<ReleaseRecord, StoreError> {
        let mut state = self.state.lock().await;
        let record = state.create_release(release);
        if let Err(e) = self.persist(&state).await {
            // Keep memory and disk in agreement
            state.releases.retain(|r| r.id != record.id);
            return Err(e);
        }
        Ok(record)
    }

    async fn set_assignment(
        &self,
        feature_id: &str,
        release_id: &str,
        assigned: bool,
        group_id: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let before = state.assignments.clone();
        state.set_assignment(feature_id, release_id, assigned, group_id)?;
        if state.assignments == before {
            return Ok(());
        }
        if let Err(e) = self.persist(&state).await {
            state.assignments = before;
            return Err(e);
        }
        Ok(())
    }

    async fn get_feature(&self, feature_id: &str) -> Result<Option<Feature>, StoreError> {
        Ok(self.state.lock().await.feature(feature_id))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
