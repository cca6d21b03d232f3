//! Bucket configuration loading.
//!
//! The configuration is an explicit value handed to the [`Seeder`] and
//! [`Reconciler`] at construction; nothing in the core reads the environment.
//!
//! The expected YAML structure is:
//! ```yaml
//! groups:
//!   weekly: "grp-weekly"
//!   monthly: "grp-monthly"
//!   quarterly: "grp-quarterly"
//!   yearly: "grp-yearly"
//! quarter_anchor_month: 1
//! horizons:
//!   weekly_months: 12
//!   monthly_months: 12
//!   quarterly_months: 12
//!   yearly_months: 60
//! temporal_field: "timeframe"
//! ```
//!
//! Every key is optional.  A granularity without a group id is skipped by both
//! seeding and reconciliation.
//!
//! [`Seeder`]: crate::seeder::Seeder
//! [`Reconciler`]: crate::reconciler::Reconciler

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::period::{Granularity, QuarterAnchor};

/// Default horizon for weekly, monthly and quarterly seeding: one year.
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

/// Default horizon for yearly seeding: five years.
pub const DEFAULT_YEARLY_HORIZON_MONTHS: u32 = 60;

/// Default name of the feature attribute carrying its timeframe.
pub const DEFAULT_TEMPORAL_FIELD: &str = "timeframe";

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    groups: GroupIds,
    quarter_anchor_month: Option<u32>,
    #[serde(default)]
    horizons: HorizonsEntry,
    temporal_field: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HorizonsEntry {
    weekly_months: Option<u32>,
    monthly_months: Option<u32>,
    quarterly_months: Option<u32>,
    yearly_months: Option<u32>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Release group id per granularity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupIds {
    #[serde(default)]
    pub weekly: Option<String>,
    #[serde(default)]
    pub monthly: Option<String>,
    #[serde(default)]
    pub quarterly: Option<String>,
    #[serde(default)]
    pub yearly: Option<String>,
}

impl GroupIds {
    /// Group for `granularity`, or `None` when unset or blank.
    pub fn get(&self, granularity: Granularity) -> Option<&str> {
        let id = match granularity {
            Granularity::Weekly => &self.weekly,
            Granularity::Monthly => &self.monthly,
            Granularity::Quarterly => &self.quarterly,
            Granularity::Yearly => &self.yearly,
        };
        id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn set(&mut self, granularity: Granularity, group_id: impl Into<String>) {
        let slot = match granularity {
            Granularity::Weekly => &mut self.weekly,
            Granularity::Monthly => &mut self.monthly,
            Granularity::Quarterly => &mut self.quarterly,
            Granularity::Yearly => &mut self.yearly,
        };
        *slot = Some(group_id.into());
    }

    /// Number of granularities with a usable group id.
    pub fn configured_count(&self) -> usize {
        Granularity::ALL
            .iter()
            .filter(|g| self.get(**g).is_some())
            .count()
    }
}

/// How far ahead of today each granularity is seeded, in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizons {
    pub weekly_months: u32,
    pub monthly_months: u32,
    pub quarterly_months: u32,
    pub yearly_months: u32,
}

impl Horizons {
    pub fn months(&self, granularity: Granularity) -> u32 {
        match granularity {
            Granularity::Weekly => self.weekly_months,
            Granularity::Monthly => self.monthly_months,
            Granularity::Quarterly => self.quarterly_months,
            Granularity::Yearly => self.yearly_months,
        }
    }
}

impl Default for Horizons {
    fn default() -> Self {
        Self {
            weekly_months: DEFAULT_HORIZON_MONTHS,
            monthly_months: DEFAULT_HORIZON_MONTHS,
            quarterly_months: DEFAULT_HORIZON_MONTHS,
            yearly_months: DEFAULT_YEARLY_HORIZON_MONTHS,
        }
    }
}

/// Complete bucket configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketConfig {
    pub groups: GroupIds,
    pub quarter_anchor: QuarterAnchor,
    pub horizons: Horizons,
    /// Feature attribute whose change triggers reconciliation.
    pub temporal_field: String,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            groups: GroupIds::default(),
            quarter_anchor: QuarterAnchor::default(),
            horizons: Horizons::default(),
            temporal_field: DEFAULT_TEMPORAL_FIELD.to_string(),
        }
    }
}

impl BucketConfig {
    /// Parses `path` into a configuration, filling absent keys with defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is structurally
    /// invalid, or `quarter_anchor_month` is outside `1..=12`.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading bucket configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse YAML")?
        };

        let defaults = Horizons::default();
        let quarter_anchor = match file.quarter_anchor_month {
            Some(m) => QuarterAnchor::new(m)?,
            None => QuarterAnchor::default(),
        };

        let config = BucketConfig {
            groups: file.groups,
            quarter_anchor,
            horizons: Horizons {
                weekly_months: file.horizons.weekly_months.unwrap_or(defaults.weekly_months),
                monthly_months: file.horizons.monthly_months.unwrap_or(defaults.monthly_months),
                quarterly_months: file
                    .horizons
                    .quarterly_months
                    .unwrap_or(defaults.quarterly_months),
                yearly_months: file.horizons.yearly_months.unwrap_or(defaults.yearly_months),
            },
            temporal_field: file
                .temporal_field
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TEMPORAL_FIELD.to_string()),
        };

        for g in Granularity::ALL {
            match config.groups.get(g) {
                Some(id) => debug!(
                    granularity = %g,
                    group_id = id,
                    horizon_months = config.horizons.months(g),
                    "  group configured"
                ),
                None => warn!(granularity = %g, "No release group configured, granularity will be skipped"),
            }
        }

        info!(
            groups = config.groups.configured_count(),
            quarter_anchor = config.quarter_anchor.month(),
            temporal_field = %config.temporal_field,
            "Bucket configuration loaded"
        );

        Ok(config)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    // ── load_from_file ────────────────────────────────────────────────────────

    #[test]
    fn load_full_yaml() {
        let yaml = r#"
groups:
  weekly: "grp-w"
  monthly: "grp-m"
  quarterly: "grp-q"
  yearly: "grp-y"
quarter_anchor_month: 8
horizons:
  weekly_months: 3
  yearly_months: 24
temporal_field: "dates"
"#;
        let f = yaml_tempfile(yaml);
        let cfg = BucketConfig::load_from_file(f.path()).unwrap();

        assert_eq!(cfg.groups.get(Granularity::Weekly), Some("grp-w"));
        assert_eq!(cfg.groups.get(Granularity::Yearly), Some("grp-y"));
        assert_eq!(cfg.groups.configured_count(), 4);
        assert_eq!(cfg.quarter_anchor.month(), 8);
        assert_eq!(cfg.horizons.months(Granularity::Weekly), 3);
        assert_eq!(cfg.horizons.months(Granularity::Monthly), 12); // default
        assert_eq!(cfg.horizons.months(Granularity::Yearly), 24);
        assert_eq!(cfg.temporal_field, "dates");
    }

    #[test]
    fn empty_file_yields_defaults() {
        let f = yaml_tempfile("");
        let cfg = BucketConfig::load_from_file(f.path()).unwrap();
        assert_eq!(cfg, BucketConfig::default());
        assert_eq!(cfg.horizons.months(Granularity::Quarterly), 12);
        assert_eq!(cfg.horizons.months(Granularity::Yearly), 60);
        assert_eq!(cfg.temporal_field, "timeframe");
    }

    #[test]
    fn blank_group_id_counts_as_unconfigured() {
        let cfg = BucketConfig::from_yaml_str("groups:\n  monthly: \"  \"\n").unwrap();
        assert_eq!(cfg.groups.get(Granularity::Monthly), None);
        assert_eq!(cfg.groups.configured_count(), 0);
    }

    #[test]
    fn invalid_anchor_is_rejected() {
        let err = BucketConfig::from_yaml_str("quarter_anchor_month: 13\n").unwrap_err();
        assert!(format!("{err:#}").contains("13"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(BucketConfig::from_yaml_str("grups:\n  weekly: x\n").is_err());
    }

    #[test]
    fn missing_file_returns_error() {
        let result = BucketConfig::load_from_file(Path::new("/nonexistent/path/buckets.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(BucketConfig::load_from_file(f.path()).is_err());
    }

    // ── GroupIds ──────────────────────────────────────────────────────────────

    #[test]
    fn set_overrides_group() {
        let mut groups = GroupIds::default();
        groups.set(Granularity::Quarterly, "grp-q2");
        assert_eq!(groups.get(Granularity::Quarterly), Some("grp-q2"));
        assert_eq!(groups.configured_count(), 1);
    }
}
