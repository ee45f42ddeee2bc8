//! Static course content and learner-supplied facts.

use super::{LearningUnitId, NodeId};
use crate::primitives::UNLIMITED_RETRIES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// UNIT TYPE
// =============================================================================

/// The kind of content a learning unit carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum UnitType {
    #[default]
    Topic,
    Practice,
    Quiz,
    Gate,
    Resource,
}

impl UnitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Practice => "practice",
            Self::Quiz => "quiz",
            Self::Gate => "gate",
            Self::Resource => "resource",
        }
    }

    /// Lenient parse: unknown kinds are treated as topics.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "practice" | "exercise" => Self::Practice,
            "quiz" | "assessment" => Self::Quiz,
            "gate" | "checkpoint" => Self::Gate,
            "resource" | "reading" | "video" => Self::Resource,
            _ => Self::Topic,
        }
    }
}

// =============================================================================
// GATE CONFIGURATION
// =============================================================================

/// What happens when a learner exhausts a gate's retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum FailStrategy {
    /// Let the learner continue past the gate.
    AllowContinue,
    /// Block the learner at the gate.
    #[default]
    Hold,
    /// Insert a practice set over the failed nodes.
    InjectPractice,
    /// Insert review entries pointing back at the units that teach the failed nodes.
    PrescribeReview,
}

impl FailStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllowContinue => "allow-continue",
            Self::Hold => "hold",
            Self::InjectPractice => "inject-practice",
            Self::PrescribeReview => "prescribe-review",
        }
    }

    /// Lenient parse: unknown strategies fall back to `Hold`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "allow-continue" | "continue" => Self::AllowContinue,
            "inject-practice" | "practice" => Self::InjectPractice,
            "prescribe-review" | "review" => Self::PrescribeReview,
            _ => Self::Hold,
        }
    }
}

/// Pass/fail policy for a gate unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    pub mastery_threshold: f64,
    pub min_questions: u32,
    /// Attempts allowed before `fail_strategy` applies; `-1` means unlimited.
    pub max_retries: i32,
    pub fail_strategy: FailStrategy,
}

impl GateConfig {
    /// Whether retries never run out.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.max_retries <= UNLIMITED_RETRIES
    }

    /// Whether a learner who has used `attempts_used` attempts may retry.
    ///
    /// Every recorded attempt counts, passed or failed.
    #[must_use]
    pub fn allows_retry(&self, attempts_used: usize) -> bool {
        if self.is_unlimited() {
            return true;
        }
        usize::try_from(self.max_retries).is_ok_and(|max| attempts_used < max)
    }
}

// =============================================================================
// ADAPTIVE PROFILE
// =============================================================================

/// Adaptive metadata attached to a learning unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdaptiveProfile {
    pub teaches_nodes: BTreeSet<NodeId>,
    pub assesses_nodes: BTreeSet<NodeId>,
    pub is_gate: bool,
    pub is_skippable: bool,
    pub gate_config: Option<GateConfig>,
}

// =============================================================================
// STATIC LEARNING UNIT
// =============================================================================

/// Immutable description of one unit of course content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticLearningUnit {
    pub id: LearningUnitId,
    pub title: String,
    pub unit_type: UnitType,
    /// Position in the course; lower comes first.
    pub sequence: u32,
    pub category: String,
    pub required: bool,
    pub estimated_minutes: Option<u32>,
    pub adaptive: Option<AdaptiveProfile>,
}

impl StaticLearningUnit {
    /// Create a plain, non-adaptive topic unit.
    #[must_use]
    pub fn new(id: impl Into<LearningUnitId>, title: impl Into<String>, sequence: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            unit_type: UnitType::Topic,
            sequence,
            category: String::new(),
            required: true,
            estimated_minutes: None,
            adaptive: None,
        }
    }

    /// Attach an adaptive profile.
    #[must_use]
    pub fn with_adaptive(mut self, profile: AdaptiveProfile) -> Self {
        self.adaptive = Some(profile);
        self
    }

    /// Set the unit type.
    #[must_use]
    pub fn with_type(mut self, unit_type: UnitType) -> Self {
        self.unit_type = unit_type;
        self
    }

    /// The gate configuration, if this unit is flagged as a gate AND carries one.
    ///
    /// A gate flag without configuration is treated as ordinary content.
    #[must_use]
    pub fn gate_config(&self) -> Option<&GateConfig> {
        self.adaptive
            .as_ref()
            .filter(|p| p.is_gate)
            .and_then(|p| p.gate_config.as_ref())
    }

    #[must_use]
    pub fn is_gate(&self) -> bool {
        self.adaptive.as_ref().is_some_and(|p| p.is_gate)
    }

    /// Nodes this unit teaches, if it has an adaptive profile.
    #[must_use]
    pub fn teaches_nodes(&self) -> Option<&BTreeSet<NodeId>> {
        self.adaptive.as_ref().map(|p| &p.teaches_nodes)
    }
}

// =============================================================================
// LEARNER FACTS
// =============================================================================

/// A learner's state on one knowledge node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeProgress {
    /// Proficiency in `[0.0, 1.0]`.
    pub mastery: f64,
    pub attempts: u32,
}

impl NodeProgress {
    /// Create progress with mastery clamped into `[0.0, 1.0]`.
    ///
    /// Non-finite mastery becomes `0.0`.
    #[must_use]
    pub fn new(mastery: f64, attempts: u32) -> Self {
        let mastery = if mastery.is_finite() {
            mastery.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { mastery, attempts }
    }
}

/// One recorded gate attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateResult {
    pub lu_id: LearningUnitId,
    pub passed: bool,
    pub score: f64,
    pub attempt_number: u32,
    pub failed_nodes: Vec<NodeId>,
}

impl GateResult {
    #[must_use]
    pub fn passed(lu_id: impl Into<LearningUnitId>, score: f64, attempt_number: u32) -> Self {
        Self {
            lu_id: lu_id.into(),
            passed: true,
            score,
            attempt_number,
            failed_nodes: Vec::new(),
        }
    }

    #[must_use]
    pub fn failed(
        lu_id: impl Into<LearningUnitId>,
        score: f64,
        attempt_number: u32,
        failed_nodes: Vec<NodeId>,
    ) -> Self {
        Self {
            lu_id: lu_id.into(),
            passed: false,
            score,
            attempt_number,
            failed_nodes,
        }
    }
}

// =============================================================================
// ADAPTIVE CONFIGURATION
// =============================================================================

/// How much adaptive behaviour a course applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum AdaptiveMode {
    /// Static playlist, adaptive metadata ignored.
    #[default]
    Off,
    /// Gates are respected; no content is injected.
    Guided,
    /// Gates, skipping and remediation injection.
    Full,
}

impl AdaptiveMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Guided => "guided",
            Self::Full => "full",
        }
    }

    /// Lenient parse: anything unrecognised switches adaptivity off.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "guided" => Self::Guided,
            "full" => Self::Full,
            _ => Self::Off,
        }
    }
}

/// Course-level adaptive settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    pub mode: AdaptiveMode,
    /// Learners may navigate forward on their own (never past a blocking gate).
    pub allow_learner_choice: bool,
    pub pre_assessment_enabled: bool,
}

impl AdaptiveConfig {
    #[must_use]
    pub fn with_mode(mode: AdaptiveMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
