//! Test double: an in-memory store whose individual calls can be scripted to
//! fail, and which records every call in order.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::memory::InMemoryReleaseStore;
use super::{Feature, NewRelease, ReleaseRecord, ReleaseStore, StoreError};

#[derive(Default)]
pub(crate) struct ScriptedStore {
    pub inner: InMemoryReleaseStore,
    list_failures: Mutex<HashMap<String, StoreError>>,
    create_failures: Mutex<HashSet<String>>,
    assign_failures: Mutex<HashSet<String>>,
    unassign_failures: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `list_releases_for_group(group_id)` returns `err`.
    pub fn fail_list(&self, group_id: &str, err: StoreError) {
        self.list_failures
            .lock()
            .unwrap()
            .insert(group_id.to_string(), err);
    }

    /// Creating a release named `name` fails with `Unavailable`.
    pub fn fail_create(&self, name: &str) {
        self.create_failures.lock().unwrap().insert(name.to_string());
    }

    pub fn fail_assign(&self, release_id: &str) {
        self.assign_failures
            .lock()
            .unwrap()
            .insert(release_id.to_string());
    }

    pub fn fail_unassign(&self, release_id: &str) {
        self.unassign_failures
            .lock()
            .unwrap()
            .insert(release_id.to_string());
    }

    /// Calls seen so far, e.g. `"list grp-m"`, `"create March 2026"`,
    /// `"assign F-1 rel-2"`, `"unassign F-1 rel-1"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ReleaseStore for ScriptedStore {
    async fn list_releases_for_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<ReleaseRecord>, StoreError> {
        self.record(format!("list {group_id}"));
        let scripted = self.list_failures.lock().unwrap().get(group_id).cloned();
        if let Some(err) = scripted {
            return Err(err);
        }
        self.inner.list_releases_for_group(group_id).await
    }

    async fn create_release(&self, release: &NewRelease) -> Result<ReleaseRecord, StoreError> {
        self.record(format!("create {}", release.name));
        if self.create_failures.lock().unwrap().contains(&release.name) {
            return Err(StoreError::Unavailable("503 Service Unavailable".into()));
        }
        self.inner.create_release(release).await
    }

    async fn set_assignment(
        &self,
        feature_id: &str,
        release_id: &str,
        assigned: bool,
        group_id: &str,
    ) -> Result<(), StoreError> {
        let verb = if assigned { "assign" } else { "unassign" };
        self.record(format!("{verb} {feature_id} {release_id}"));
        let failures = if assigned {
            &self.assign_failures
        } else {
            &self.unassign_failures
        };
        if failures.lock().unwrap().contains(release_id) {
            return Err(StoreError::RateLimited);
        }
        self.inner
            .set_assignment(feature_id, release_id, assigned, group_id)
            .await
    }

    async fn get_feature(&self, feature_id: &str) -> Result<Option<Feature>, StoreError> {
        self.inner.get_feature(feature_id).await
    }
}
