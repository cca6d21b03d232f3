/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info, warn};

use release_buckets::calendar::{date_only_key, parse_day};
use release_buckets::config::BucketConfig;
use release_buckets::event::FeatureChangeEvent;
use release_buckets::period::{self, Granularity, QuarterAnchor};
use release_buckets::reconciler::{EventDisposition, Reconciler};
use release_buckets::seeder::{SeedError, Seeder};
use release_buckets::store::file::FileReleaseStore;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Calendar release buckets: generate periods, seed the release catalog and
/// reconcile feature assignments.
///
/// Example:
///   release-buckets seed -c buckets.yaml -s catalog.yaml
///   release-buckets reconcile -c buckets.yaml -s catalog.yaml -f F-1 --changed timeframe
#[derive(Debug, Parser)]
#[command(
    name = "release-buckets",
    about = "Calendar release buckets – seeding and assignment",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the periods one generator yields for a date range.
    Periods {
        /// weekly, monthly, quarterly or yearly.
        #[arg(short = 'g', long = "granularity")]
        granularity: Granularity,

        /// First day of the range (YYYY-MM-DD or RFC 3339).
        #[arg(long = "from", value_parser = parse_date_arg)]
        from: DateTime<Utc>,

        /// Last day of the range (YYYY-MM-DD or RFC 3339).
        #[arg(long = "to", value_parser = parse_date_arg)]
        to: DateTime<Utc>,

        /// Fiscal-year start month for quarters (1-12).
        #[arg(short = 'a', long = "anchor", default_value_t = 1)]
        anchor: u32,
    },

    /// Create the release records missing from every configured group.
    Seed {
        #[command(flatten)]
        store: StoreArgs,

        /// Seed as if today were this date (defaults to the current UTC date).
        #[arg(long = "today", value_parser = parse_date_arg)]
        today: Option<DateTime<Utc>>,
    },

    /// Assign one feature to the matching release of every granularity.
    Reconcile {
        #[command(flatten)]
        store: StoreArgs,

        /// Feature id to reconcile.
        #[arg(short = 'f', long = "feature")]
        feature: String,

        /// Attributes changed by the triggering update.  When given, the
        /// feature is only reconciled if the temporal field is among them.
        #[arg(long = "changed")]
        changed: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct StoreArgs {
    /// Path to the YAML bucket configuration.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Path to the YAML release catalog (created if missing).
    #[arg(short = 's', long = "catalog")]
    catalog: PathBuf,

    /// Override the configured quarter anchor month (1-12).
    #[arg(short = 'a', long = "anchor")]
    anchor: Option<u32>,
}

fn parse_date_arg(s: &str) -> Result<DateTime<Utc>, String> {
    parse_day(s).ok_or_else(|| format!("'{s}' is not a YYYY-MM-DD date or RFC 3339 timestamp"))
}

// ── Output ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PeriodLine {
    name: String,
    start: String,
    end: String,
    days: i64,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise summary")?;
    println!("{json}");
    Ok(())
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn load_config(args: &StoreArgs) -> Result<Arc<BucketConfig>> {
    let mut config = match &args.config {
        Some(path) => BucketConfig::load_from_file(path)?,
        None => {
            warn!("No configuration file provided, every granularity will be skipped");
            BucketConfig::default()
        }
    };
    if let Some(m) = args.anchor {
        config.quarter_anchor = QuarterAnchor::new(m)?;
        info!(quarter_anchor = m, "Quarter anchor overridden from command line");
    }
    Ok(Arc::new(config))
}

fn open_store(args: &StoreArgs) -> Result<Arc<FileReleaseStore>> {
    let store = FileReleaseStore::open(&args.catalog)?;
    Ok(Arc::new(store))
}

fn run_periods(
    granularity: Granularity,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    anchor: u32,
) -> Result<()> {
    let anchor = QuarterAnchor::new(anchor)?;
    let periods = period::generate(granularity, from, to, anchor);
    info!(
        granularity = %granularity,
        from = %date_only_key(from),
        to = %date_only_key(to),
        count = periods.len(),
        "Generated periods"
    );
    let lines: Vec<PeriodLine> = periods
        .iter()
        .map(|p| PeriodLine {
            name: p.name.clone(),
            start: date_only_key(p.start),
            end: date_only_key(p.end),
            days: p.len_days(),
        })
        .collect();
    print_json(&lines)
}

/// Returns `false` when seeding failed outright.
async fn run_seed(args: &StoreArgs, today: Option<DateTime<Utc>>) -> Result<bool> {
    let config = load_config(args)?;
    let store = open_store(args)?;
    let seeder = Seeder::new(store, config);

    match seeder.seed_all(today.unwrap_or_else(Utc::now)).await {
        Ok(summary) => {
            print_json(&summary)?;
            Ok(true)
        }
        Err(e) => {
            error!("{e}");
            let SeedError::AllGroupsUnavailable { failures } = &e;
            print_json(&serde_json::json!({
                "status": "failed",
                "error": e.to_string(),
                "failures": failures,
            }))?;
            Ok(false)
        }
    }
}

async fn run_reconcile(args: &StoreArgs, feature_id: &str, changed: Vec<String>) -> Result<()> {
    let config = load_config(args)?;
    let store = open_store(args)?;
    let reconciler = Reconciler::new(store.clone(), config.clone());

    let event = if changed.is_empty() {
        // Admin trigger: reconcile unconditionally
        FeatureChangeEvent::new(feature_id, [config.temporal_field.clone()])
    } else {
        FeatureChangeEvent::new(feature_id, changed)
    };

    let disposition = reconciler
        .handle_event(&event)
        .await
        .with_context(|| format!("Failed to look up feature '{feature_id}'"))?;

    if let EventDisposition::FeatureNotFound { .. } = &disposition {
        warn!(
            feature_id,
            catalog = %store.path().display(),
            "Feature is not present in the catalog"
        );
    }

    print_json(&disposition)
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialise structured logging on stderr; stdout carries the JSON summary.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Periods {
            granularity,
            from,
            to,
            anchor,
        } => run_periods(granularity, from, to, anchor).map(|()| true),
        Command::Seed { store, today } => run_seed(&store, today).await,
        Command::Reconcile {
            store,
            feature,
            changed,
        } => run_reconcile(&store, &feature, changed).await.map(|()| true),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            error!("{:#}", e);
            process::exit(1);
        }
    }
}
