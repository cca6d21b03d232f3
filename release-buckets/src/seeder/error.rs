/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for catalog seeding.
//!
//! Seeding isolates failures per period and per group, so almost nothing
//! escalates: a failed creation becomes a [`FailedPeriod`] entry and a failed
//! catalog fetch marks only that group as failed.  The single hard failure is
//! [`SeedError::AllGroupsUnavailable`], raised when not one configured group
//! could be listed.
//!
//! [`FailedPeriod`]: super::FailedPeriod

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::period::Granularity;
use crate::store::StoreError;

/// Catalog fetch failure for one release group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFetchFailure {
    pub granularity: Granularity,
    pub group_id: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: StoreError,
}

impl fmt::Display for GroupFetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} group '{}': {}",
            self.granularity, self.group_id, self.error
        )
    }
}

fn serialize_display<S: serde::Serializer>(
    value: &StoreError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Top-level error returned by
/// [`Seeder::seed_all()`](super::Seeder::seed_all).
#[derive(Debug, Error)]
pub enum SeedError {
    /// Every configured group's catalog fetch failed; nothing could be seeded.
    #[error(
        "all {} configured release group(s) are unavailable: {}",
        .failures.len(),
        join_failures(.failures)
    )]
    AllGroupsUnavailable { failures: Vec<GroupFetchFailure> },
}

fn join_failures(failures: &[GroupFetchFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
