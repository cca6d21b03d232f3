/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Release buckets – calendar release periods for time-bound features.
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── calendar/     – UTC day-only semantics, date arithmetic
//! ├── period/       – weekly / monthly / quarterly / yearly generators
//! ├── matcher       – feature end date → release lookup
//! ├── store/        – release store port + memory and YAML file adapters
//! ├── seeder/       – idempotent catalog seeding per release group
//! ├── reconciler    – one assignment per granularity per feature
//! ├── event         – feature-change event filtering
//! └── config/       – YAML bucket configuration
//! ```

pub mod calendar;
pub mod config;
pub mod event;
pub mod matcher;
pub mod period;
pub mod reconciler;
pub mod seeder;
pub mod store;
