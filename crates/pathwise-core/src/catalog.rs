//! # Catalog Adapters
//!
//! Translate external course and unit records into the engine's input shape.
//!
//! Records arrive in arbitrary order and may omit any optional field. The
//! adapters fill defaults from [`primitives`](crate::primitives), parse
//! enum strings leniently, and order units the way the engine expects.

use crate::primitives::{
    DEFAULT_GATE_MASTERY_THRESHOLD, DEFAULT_GATE_MAX_RETRIES, DEFAULT_GATE_MIN_QUESTIONS,
};
use crate::{
    AdaptiveConfig, AdaptiveMode, AdaptiveProfile, FailStrategy, GateConfig, NodeId,
    PathwiseError, StaticLearningUnit, UnitType,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// RECORDS
// =============================================================================

/// One unit as it appears in a course catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRecord {
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub unit_type: Option<String>,
    pub sequence: Option<u32>,
    pub category: Option<String>,
    pub required: Option<bool>,
    pub estimated_minutes: Option<u32>,
    pub adaptive: Option<CatalogAdaptive>,
}

/// Adaptive metadata of a catalog unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogAdaptive {
    pub teaches_nodes: Vec<String>,
    pub assesses_nodes: Vec<String>,
    pub is_gate: bool,
    pub is_skippable: bool,
    pub gate: Option<CatalogGate>,
}

/// Gate settings of a catalog unit. Missing fields take engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogGate {
    pub mastery_threshold: Option<f64>,
    pub min_questions: Option<u32>,
    pub max_retries: Option<i32>,
    pub fail_strategy: Option<String>,
}

/// Course-level adaptive settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseRecord {
    pub adaptive_mode: Option<String>,
    pub allow_learner_choice: bool,
    pub pre_assessment_enabled: bool,
}

// =============================================================================
// ADAPTERS
// =============================================================================

/// Map catalog records to the engine's static unit list.
///
/// Records with a `sequence` come first, ordered by it; records without one
/// follow in source order and receive sequence numbers after the largest
/// given one. Equal sequence numbers are ordered by id, as the engine does.
///
/// # Errors
///
/// `InvalidManifest` for an empty or duplicate unit id.
pub fn units_from_catalog(
    records: Vec<CatalogRecord>,
) -> Result<Vec<StaticLearningUnit>, PathwiseError> {
    let mut seen = BTreeSet::new();
    for record in &records {
        if record.id.trim().is_empty() {
            return Err(PathwiseError::InvalidManifest(
                "unit with empty id".to_string(),
            ));
        }
        if !seen.insert(record.id.as_str()) {
            return Err(PathwiseError::InvalidManifest(format!(
                "duplicate unit id: {}",
                record.id
            )));
        }
    }

    let max_sequence = records.iter().filter_map(|r| r.sequence).max().unwrap_or(0);
    let mut next_free = max_sequence;

    let mut units: Vec<StaticLearningUnit> = records
        .into_iter()
        .map(|record| {
            let sequence = record.sequence.unwrap_or_else(|| {
                next_free = next_free.saturating_add(1);
                next_free
            });
            unit_from_record(record, sequence)
        })
        .collect();
    units.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.id.cmp(&b.id)));

    tracing::debug!(units = units.len(), "mapped catalog records");
    Ok(units)
}

fn unit_from_record(record: CatalogRecord, sequence: u32) -> StaticLearningUnit {
    let title = record.title.unwrap_or_else(|| record.id.clone());
    let mut unit = StaticLearningUnit::new(record.id, title, sequence)
        .with_type(record.unit_type.as_deref().map_or(UnitType::Topic, UnitType::parse));
    unit.category = record.category.unwrap_or_default();
    unit.required = record.required.unwrap_or(true);
    unit.estimated_minutes = record.estimated_minutes;
    unit.adaptive = record.adaptive.map(profile_from_record);
    unit
}

fn profile_from_record(adaptive: CatalogAdaptive) -> AdaptiveProfile {
    AdaptiveProfile {
        teaches_nodes: node_set(adaptive.teaches_nodes),
        assesses_nodes: node_set(adaptive.assesses_nodes),
        is_gate: adaptive.is_gate,
        is_skippable: adaptive.is_skippable,
        gate_config: adaptive.gate.map(|gate| GateConfig {
            mastery_threshold: gate
                .mastery_threshold
                .unwrap_or(DEFAULT_GATE_MASTERY_THRESHOLD),
            min_questions: gate.min_questions.unwrap_or(DEFAULT_GATE_MIN_QUESTIONS),
            max_retries: gate.max_retries.unwrap_or(DEFAULT_GATE_MAX_RETRIES),
            fail_strategy: gate
                .fail_strategy
                .as_deref()
                .map_or_else(FailStrategy::default, FailStrategy::parse),
        }),
    }
}

fn node_set(ids: Vec<String>) -> BTreeSet<NodeId> {
    ids.into_iter().map(NodeId::from).collect()
}

/// Map course settings to the engine configuration.
///
/// A missing or unrecognised mode means adaptivity is off.
#[must_use]
pub fn adaptive_config_from_course(course: &CourseRecord) -> AdaptiveConfig {
    let mode = course
        .adaptive_mode
        .as_deref()
        .map_or(AdaptiveMode::Off, |raw| {
            let mode = AdaptiveMode::parse(raw);
            if mode == AdaptiveMode::Off && !raw.trim().eq_ignore_ascii_case("off") {
                tracing::warn!(mode = raw, "unknown adaptive mode, adaptivity disabled");
            }
            mode
        });

    AdaptiveConfig {
        mode,
        allow_learner_choice: course.allow_learner_choice,
        pre_assessment_enabled: course.pre_assessment_enabled,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LearningUnitId, UNLIMITED_RETRIES};

    fn record(id: &str, sequence: Option<u32>) -> CatalogRecord {
        CatalogRecord {
            id: id.to_string(),
            sequence,
            ..CatalogRecord::default()
        }
    }

    #[test]
    fn records_are_sorted_by_sequence() {
        let units = units_from_catalog(vec![
            record("c", Some(30)),
            record("a", Some(10)),
            record("b", Some(20)),
        ])
        .expect("map");
        let ids: Vec<&str> = units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn unsequenced_records_follow_in_source_order() {
        let units = units_from_catalog(vec![
            record("z", None),
            record("a", Some(5)),
            record("m", None),
        ])
        .expect("map");
        let ids: Vec<&str> = units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "z", "m"]);
        assert_eq!(units[1].sequence, 6);
        assert_eq!(units[2].sequence, 7);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let units = units_from_catalog(vec![record("intro", Some(1))]).expect("map");
        let unit = &units[0];
        assert_eq!(unit.title, "intro");
        assert_eq!(unit.unit_type, UnitType::Topic);
        assert!(unit.required);
        assert!(unit.adaptive.is_none());
    }

    #[test]
    fn gate_defaults_fill_missing_settings() {
        let mut gate = record("checkpoint", Some(1));
        gate.unit_type = Some("gate".to_string());
        gate.adaptive = Some(CatalogAdaptive {
            is_gate: true,
            gate: Some(CatalogGate {
                max_retries: Some(UNLIMITED_RETRIES),
                fail_strategy: Some("prescribe_review".to_string()),
                ..CatalogGate::default()
            }),
            ..CatalogAdaptive::default()
        });

        let units = units_from_catalog(vec![gate]).expect("map");
        let config = units[0].gate_config().expect("gate config");
        assert_eq!(config.min_questions, DEFAULT_GATE_MIN_QUESTIONS);
        assert!(config.is_unlimited());
        assert_eq!(config.fail_strategy, FailStrategy::PrescribeReview);
        assert_eq!(units[0].id, LearningUnitId::new("checkpoint"));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = units_from_catalog(vec![record("a", Some(1)), record("a", Some(2))])
            .expect_err("duplicate");
        assert!(matches!(err, PathwiseError::InvalidManifest(_)));
        assert!(units_from_catalog(vec![record(" ", Some(1))]).is_err());
    }

    #[test]
    fn course_mode_is_lenient() {
        let course = |mode: Option<&str>| CourseRecord {
            adaptive_mode: mode.map(str::to_string),
            allow_learner_choice: true,
            ..CourseRecord::default()
        };
        assert_eq!(adaptive_config_from_course(&course(Some("full"))).mode, AdaptiveMode::Full);
        assert_eq!(adaptive_config_from_course(&course(Some("GUIDED"))).mode, AdaptiveMode::Guided);
        assert_eq!(adaptive_config_from_course(&course(Some("turbo"))).mode, AdaptiveMode::Off);
        assert_eq!(adaptive_config_from_course(&course(None)).mode, AdaptiveMode::Off);
        assert!(adaptive_config_from_course(&course(None)).allow_learner_choice);
    }

    #[test]
    fn records_deserialize_from_json() {
        let json = r#"{"id":"q1","type":"quiz","adaptive":{"assesses_nodes":["n1"]}}"#;
        let record: CatalogRecord = serde_json::from_str(json).expect("parse");
        let units = units_from_catalog(vec![record]).expect("map");
        assert_eq!(units[0].unit_type, UnitType::Quiz);
        let profile = units[0].adaptive.as_ref().expect("profile");
        assert!(profile.assesses_nodes.contains(&NodeId::new("n1")));
        assert!(profile.gate_config.is_none());
    }
}
