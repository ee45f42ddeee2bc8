//! Playlist entries and the learner session snapshot.

use super::{
    EnrollmentId, GateResult, LearningUnitId, ModuleId, NodeId, NodeProgress, StaticLearningUnit,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// INJECTED ENTRIES
// =============================================================================

/// Synthetic practice set inserted after a failed gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectedPractice {
    pub id: String,
    pub source_gate: LearningUnitId,
    pub target_node_ids: Vec<NodeId>,
    pub question_count: u32,
}

impl InjectedPractice {
    /// Build a practice entry whose identity is derived from its provenance.
    ///
    /// `attempt` is the number of gate attempts recorded when the entry was
    /// prescribed, so a later failure of the same gate yields a new identity.
    #[must_use]
    pub fn new(
        source_gate: &LearningUnitId,
        attempt: usize,
        target_node_ids: Vec<NodeId>,
        question_count: u32,
    ) -> Self {
        Self {
            id: format!("injected-practice-{}-{}", source_gate, attempt),
            source_gate: source_gate.clone(),
            target_node_ids,
            question_count,
        }
    }
}

/// Synthetic entry sending the learner back over an existing teaching unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectedReview {
    pub id: String,
    pub source_gate: LearningUnitId,
    pub reference_lu_id: LearningUnitId,
    pub reference_title: String,
    pub covered_node_ids: Vec<NodeId>,
}

impl InjectedReview {
    #[must_use]
    pub fn new(
        source_gate: &LearningUnitId,
        attempt: usize,
        reference: &StaticLearningUnit,
        covered_node_ids: Vec<NodeId>,
    ) -> Self {
        Self {
            id: format!(
                "injected-review-{}-{}-{}",
                source_gate, attempt, reference.id
            ),
            source_gate: source_gate.clone(),
            reference_lu_id: reference.id.clone(),
            reference_title: reference.title.clone(),
            covered_node_ids,
        }
    }
}

// =============================================================================
// PLAYLIST ENTRY
// =============================================================================

/// What occupies one slot of a learner's playlist.
///
/// Only `Static` entries can be gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaylistEntry {
    Static(StaticLearningUnit),
    InjectedPractice(InjectedPractice),
    InjectedReview(InjectedReview),
}

/// Discriminant of a [`PlaylistEntry`], for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Static,
    InjectedPractice,
    InjectedReview,
}

impl PlaylistEntry {
    /// Stable identity of this entry within a playlist.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Static(unit) => format!("static-{}", unit.id),
            Self::InjectedPractice(p) => p.id.clone(),
            Self::InjectedReview(r) => r.id.clone(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::Static(_) => EntryKind::Static,
            Self::InjectedPractice(_) => EntryKind::InjectedPractice,
            Self::InjectedReview(_) => EntryKind::InjectedReview,
        }
    }

    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Static(unit) => unit.title.clone(),
            Self::InjectedPractice(p) => {
                let nodes: Vec<&str> = p.target_node_ids.iter().map(NodeId::as_str).collect();
                format!("Practice: {}", nodes.join(", "))
            }
            Self::InjectedReview(r) => format!("Review: {}", r.reference_title),
        }
    }

    /// The wrapped unit, for static entries.
    #[must_use]
    pub fn as_static(&self) -> Option<&StaticLearningUnit> {
        match self {
            Self::Static(unit) => Some(unit),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_gate(&self) -> bool {
        self.as_static().is_some_and(StaticLearningUnit::is_gate)
    }
}

/// A de-normalized playlist row for sidebar rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub index: usize,
    pub entry_id: String,
    pub title: String,
    pub kind: EntryKind,
    pub is_gate: bool,
    pub is_current: bool,
    pub is_completed: bool,
    /// Beyond the first unresolved gate; navigation cannot reach it yet.
    pub is_locked: bool,
}

// =============================================================================
// LEARNER MODULE SESSION
// =============================================================================

/// Full state of one learner working through one module.
///
/// Treated as an immutable value: the engine hands out shared snapshots and
/// copies before writing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerModuleSession {
    pub enrollment_id: EnrollmentId,
    pub module_id: ModuleId,
    pub playlist: Vec<PlaylistEntry>,
    /// May equal `playlist.len()` once the learner has moved past the end.
    pub current_index: usize,
    pub is_complete: bool,
    pub node_progress: BTreeMap<NodeId, NodeProgress>,
    /// Append-only attempt history per gate unit.
    pub gate_results: BTreeMap<LearningUnitId, Vec<GateResult>>,
}

impl LearnerModuleSession {
    /// Create an empty session for an enrollment/module pair.
    #[must_use]
    pub fn new(enrollment_id: EnrollmentId, module_id: ModuleId) -> Self {
        Self {
            enrollment_id,
            module_id,
            playlist: Vec::new(),
            current_index: 0,
            is_complete: false,
            node_progress: BTreeMap::new(),
            gate_results: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<&PlaylistEntry> {
        self.playlist.get(self.current_index)
    }

    /// Number of injected (non-static) entries in the playlist.
    #[must_use]
    pub fn injected_count(&self) -> usize {
        self.playlist
            .iter()
            .filter(|e| e.kind() != EntryKind::Static)
            .count()
    }
}

/// A session as it crosses the persistence boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub enrollment_id: EnrollmentId,
    pub module_id: ModuleId,
    /// Bumped by the store on every save.
    pub revision: u64,
    pub session: LearnerModuleSession,
}

impl PersistedSession {
    #[must_use]
    pub fn new(session: LearnerModuleSession) -> Self {
        Self {
            enrollment_id: session.enrollment_id.clone(),
            module_id: session.module_id.clone(),
            revision: 0,
            session,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
