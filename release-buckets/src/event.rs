//! Feature-change events.
//!
//! The outer layer (webhook handler, admin trigger) turns every feature update
//! into a [`FeatureChangeEvent`].  Only events whose changed-attribute set
//! includes the temporal field are reconciled; everything else, including the
//! updates produced by the reconciler's own assignment writes, is dropped.

use serde::Deserialize;

use crate::store::Feature;

/// A feature update as delivered by the outer layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureChangeEvent {
    pub feature_id: String,
    /// Attribute names changed by the update (e.g. `timeframe`, `status`).
    #[serde(default)]
    pub changed_fields: Vec<String>,
    /// Feature payload, when the event carries one.  Looked up from the store
    /// otherwise.
    #[serde(default)]
    pub feature: Option<Feature>,
}

impl FeatureChangeEvent {
    pub fn new<I, S>(feature_id: impl Into<String>, changed_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            feature_id: feature_id.into(),
            changed_fields: changed_fields.into_iter().map(Into::into).collect(),
            feature: None,
        }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.feature = Some(feature);
        self
    }

    /// `true` if `field` (or one of its sub-attributes such as
    /// `timeframe.end`) is among the changed fields.  Case-insensitive.
    pub fn touches(&self, field: &str) -> bool {
        let field = field.trim();
        self.changed_fields.iter().any(|changed| {
            let changed = changed.trim();
            changed.eq_ignore_ascii_case(field)
                || (changed
                    .get(..field.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(field))
                    && changed[field.len()..].starts_with('.'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_field_matches() {
        assert!(FeatureChangeEvent::new("F-1", ["status", "timeframe"]).touches("timeframe"));
    }

    #[test]
    fn sub_attribute_and_case_match() {
        assert!(FeatureChangeEvent::new("F-1", ["Timeframe.End"]).touches("timeframe"));
    }

    #[test]
    fn unrelated_or_prefix_only_fields_do_not_match() {
        let event = FeatureChangeEvent::new("F-1", ["releases", "timeframes", "time"]);
        assert!(!event.touches("timeframe"));
        assert!(!FeatureChangeEvent::new("F-1", Vec::<String>::new()).touches("timeframe"));
    }

    #[test]
    fn event_deserialises_with_inline_feature() {
        let yaml = r#"
feature_id: F-7
changed_fields: [timeframe]
feature:
  id: F-7
  timeframe_end: 2026-02-03T10:00:00Z
  release_ids: [rel-3]
"#;
        let event: FeatureChangeEvent = serde_yaml::from_str(yaml).unwrap();
        assert!(event.touches("timeframe"));
        let feature = event.feature.unwrap();
        assert_eq!(feature.release_ids, vec!["rel-3".to_string()]);
    }
}
