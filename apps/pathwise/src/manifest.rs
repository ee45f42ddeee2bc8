//! # Course Manifest
//!
//! TOML description of one course module: a `[course]` table with the module
//! id and adaptive settings, and one `[[units]]` entry per learning unit.
//!
//! ```toml
//! [course]
//! id = "algebra-1"
//! adaptive_mode = "full"
//! allow_learner_choice = true
//!
//! [[units]]
//! id = "intro"
//! sequence = 1
//!
//! [[units]]
//! id = "checkpoint"
//! type = "gate"
//! sequence = 2
//! [units.adaptive]
//! is_gate = true
//! [units.adaptive.gate]
//! max_retries = 2
//! fail_strategy = "prescribe-review"
//! ```

use pathwise_core::{
    AdaptiveConfig, CatalogRecord, CourseRecord, ModuleId, PathwiseError, StaticLearningUnit,
    adaptive_config_from_course, units_from_catalog,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maximum manifest size (4 MB).
const MAX_MANIFEST_SIZE: u64 = 4 * 1024 * 1024;

/// The `[course]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestCourse {
    /// Module id; sessions are stored under it.
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub settings: CourseRecord,
}

/// A parsed course manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseManifest {
    pub course: ManifestCourse,
    #[serde(default)]
    pub units: Vec<CatalogRecord>,
}

impl CourseManifest {
    /// Parse a manifest from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, PathwiseError> {
        let manifest: Self =
            toml::from_str(text).map_err(|e| PathwiseError::InvalidManifest(e.to_string()))?;
        if manifest.course.id.trim().is_empty() {
            return Err(PathwiseError::InvalidManifest(
                "course id must not be empty".to_string(),
            ));
        }
        Ok(manifest)
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, PathwiseError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            PathwiseError::IoError(format!("Cannot read manifest '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_MANIFEST_SIZE {
            return Err(PathwiseError::InvalidManifest(format!(
                "Manifest size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_MANIFEST_SIZE
            )));
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| PathwiseError::IoError(format!("Read manifest: {}", e)))?;
        let manifest = Self::from_toml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            module = %manifest.course.id,
            units = manifest.units.len(),
            "loaded course manifest"
        );
        Ok(manifest)
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        ModuleId::new(self.course.id.clone())
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.course.title.as_deref().unwrap_or(&self.course.id)
    }

    #[must_use]
    pub fn adaptive_config(&self) -> AdaptiveConfig {
        adaptive_config_from_course(&self.course.settings)
    }

    /// The course units in playlist order.
    pub fn units(&self) -> Result<Vec<StaticLearningUnit>, PathwiseError> {
        units_from_catalog(self.units.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathwise_core::{AdaptiveMode, FailStrategy};

    const SAMPLE: &str = r#"
[course]
id = "algebra-1"
title = "Algebra I"
adaptive_mode = "full"
allow_learner_choice = true

[[units]]
id = "checkpoint"
type = "gate"
sequence = 2
[units.adaptive]
is_gate = true
[units.adaptive.gate]
max_retries = 2
fail_strategy = "prescribe-review"

[[units]]
id = "intro"
title = "Introduction"
sequence = 1
[units.adaptive]
teaches_nodes = ["variables"]
"#;

    #[test]
    fn parses_course_and_units() {
        let manifest = CourseManifest::from_toml_str(SAMPLE).expect("parse");
        assert_eq!(manifest.module_id(), ModuleId::new("algebra-1"));
        assert_eq!(manifest.title(), "Algebra I");

        let config = manifest.adaptive_config();
        assert_eq!(config.mode, AdaptiveMode::Full);
        assert!(config.allow_learner_choice);

        let units = manifest.units().expect("units");
        assert_eq!(units[0].id.as_str(), "intro");
        let gate = units[1].gate_config().expect("gate");
        assert_eq!(gate.max_retries, 2);
        assert_eq!(gate.fail_strategy, FailStrategy::PrescribeReview);
    }

    #[test]
    fn missing_course_id_rejected() {
        let err = CourseManifest::from_toml_str("[course]\nid = \"\"\n").expect_err("empty id");
        assert!(matches!(err, PathwiseError::InvalidManifest(_)));
        assert!(CourseManifest::from_toml_str("units = 3").is_err());
    }

    #[test]
    fn adaptive_mode_defaults_to_off() {
        let manifest = CourseManifest::from_toml_str("[course]\nid = \"m\"\n").expect("parse");
        assert_eq!(manifest.adaptive_config().mode, AdaptiveMode::Off);
        assert!(manifest.units().expect("units").is_empty());
        assert_eq!(manifest.title(), "m");
    }
}
