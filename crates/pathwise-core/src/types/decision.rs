//! Strategy input (context) and output (decision).

use super::{
    AdaptiveConfig, GateResult, LearningUnitId, NodeId, NodeProgress, PlaylistEntry,
    StaticLearningUnit,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// DECISION
// =============================================================================

/// The sole output of a sequencing strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlaylistDecision {
    /// Move to the next entry.
    Advance,
    /// The module is finished.
    Complete,
    /// Block forward navigation.
    Hold { message: String },
    /// Reattempt the gate in the current slot.
    Retry {
        #[serde(rename = "luId")]
        lu_id: LearningUnitId,
    },
    /// Move past the current entry because the learner already knows it.
    Skip { reason: String },
    /// Insert remediation after the current entry, then move into it.
    Inject { entries: Vec<PlaylistEntry> },
}

impl PlaylistDecision {
    /// Short name of the decision variant.
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::Complete => "complete",
            Self::Hold { .. } => "hold",
            Self::Retry { .. } => "retry",
            Self::Skip { .. } => "skip",
            Self::Inject { .. } => "inject",
        }
    }

    /// Whether the learner is stopped at the current entry until something changes.
    ///
    /// An injection counts: moving past the gate without taking the
    /// remediation would skip it.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::Hold { .. } | Self::Retry { .. } | Self::Inject { .. }
        )
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Read-only view of a session handed to a strategy.
#[derive(Debug, Clone, Copy)]
pub struct PlaylistContext<'a> {
    pub static_sequence: &'a [StaticLearningUnit],
    pub playlist: &'a [PlaylistEntry],
    pub current_index: usize,
    pub node_progress: &'a BTreeMap<NodeId, NodeProgress>,
    pub gate_results: &'a BTreeMap<LearningUnitId, Vec<GateResult>>,
    pub adaptive_config: &'a AdaptiveConfig,
}

impl<'a> PlaylistContext<'a> {
    /// The same context positioned at another index.
    #[must_use]
    pub fn at(&self, index: usize) -> Self {
        Self {
            current_index: index,
            ..*self
        }
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<&'a PlaylistEntry> {
        self.playlist.get(self.current_index)
    }

    /// True for an empty playlist or when positioned on/after the last entry.
    #[must_use]
    pub fn is_last_or_beyond(&self) -> bool {
        self.current_index.saturating_add(1) >= self.playlist.len()
    }

    #[must_use]
    pub fn latest_gate_result(&self, lu_id: &LearningUnitId) -> Option<&'a GateResult> {
        self.gate_results.get(lu_id).and_then(|h| h.last())
    }

    /// Number of recorded attempts for a unit, passed or failed.
    #[must_use]
    pub fn attempts_used(&self, lu_id: &LearningUnitId) -> usize {
        self.gate_results.get(lu_id).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn mastery(&self, node: &NodeId) -> Option<f64> {
        self.node_progress.get(node).map(|p| p.mastery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_json_carries_action_tag() {
        let retry = PlaylistDecision::Retry {
            lu_id: LearningUnitId::new("gate-1"),
        };
        let json = serde_json::to_value(&retry).expect("serialize");
        assert_eq!(json["action"], "retry");
        assert_eq!(json["luId"], "gate-1");

        let back: PlaylistDecision = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, retry);
    }

    #[test]
    fn blocking_decisions() {
        assert!(PlaylistDecision::Hold { message: String::new() }.is_blocking());
        assert!(!PlaylistDecision::Advance.is_blocking());
        assert!(!PlaylistDecision::Skip { reason: String::new() }.is_blocking());
        assert!(!PlaylistDecision::Complete.is_blocking());
    }
}
