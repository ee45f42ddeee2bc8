//! # Playlist Engine
//!
//! Stateful orchestrator for one learner working through one module.
//!
//! The engine owns:
//! - the immutable static unit sequence and adaptive configuration
//! - the sequencing strategy selected by the configuration's mode
//! - the current [`LearnerModuleSession`] snapshot
//!
//! ## Copy-on-write snapshots
//!
//! Snapshots are handed out as `Arc<LearnerModuleSession>`. Every mutating
//! call goes through `Arc::make_mut`, so a snapshot a caller still holds is
//! cloned before the write and never changes underneath them.
//!
//! ## Totality
//!
//! No method fails. Out-of-range indices and results for unknown units are
//! accepted and have no further effect.

use crate::strategy::{SequencingStrategy, strategy_for_mode};
use crate::{
    AdaptiveConfig, DisplayEntry, EnrollmentId, GateResult, LearnerModuleSession, ModuleId,
    NodeId, NodeProgress, PersistedSession, PlaylistContext, PlaylistDecision, PlaylistEntry,
    StaticLearningUnit,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Session engine for one (enrollment, module) pair.
#[derive(Debug)]
pub struct PlaylistEngine {
    config: AdaptiveConfig,
    static_sequence: Vec<StaticLearningUnit>,
    strategy: Box<dyn SequencingStrategy>,
    session: Arc<LearnerModuleSession>,
}

impl PlaylistEngine {
    /// Start a fresh session.
    ///
    /// Units are ordered by `(sequence, id)` regardless of input order.
    #[must_use]
    pub fn new(
        config: AdaptiveConfig,
        units: Vec<StaticLearningUnit>,
        enrollment_id: EnrollmentId,
        module_id: ModuleId,
        initial_progress: Option<BTreeMap<NodeId, NodeProgress>>,
    ) -> Self {
        let mut session = LearnerModuleSession::new(enrollment_id, module_id);
        session.node_progress = normalized(initial_progress.unwrap_or_default());

        let mut engine = Self {
            config,
            static_sequence: sorted(units),
            strategy: strategy_for_mode(config.mode),
            session: Arc::new(session),
        };
        engine.initialize_playlist();
        engine
    }

    /// Rebuild an engine from a persisted snapshot and the static unit list.
    ///
    /// Gate history, mastery, injected entries and position are kept as
    /// persisted, with mastery clamped into `[0, 1]`. Static entries are refreshed from `units` by id so catalog
    /// edits (titles, metadata) reach an in-flight session; entries whose unit
    /// no longer exists keep their persisted copy.
    #[must_use]
    pub fn restore(
        config: AdaptiveConfig,
        units: Vec<StaticLearningUnit>,
        persisted: PersistedSession,
    ) -> Self {
        let static_sequence = sorted(units);
        let mut session = persisted.session;
        session.node_progress = normalized(std::mem::take(&mut session.node_progress));

        for entry in &mut session.playlist {
            if let PlaylistEntry::Static(unit) = entry
                && let Some(fresh) = static_sequence.iter().find(|u| u.id == unit.id)
            {
                *unit = fresh.clone();
            }
        }
        session.current_index = session.current_index.min(session.playlist.len());

        tracing::debug!(
            enrollment = %session.enrollment_id,
            module = %session.module_id,
            revision = persisted.revision,
            entries = session.playlist.len(),
            current_index = session.current_index,
            "restored playlist session"
        );

        Self {
            config,
            static_sequence,
            strategy: strategy_for_mode(config.mode),
            session: Arc::new(session),
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// The current snapshot. Cheap to clone and safe to retain.
    #[must_use]
    pub fn session(&self) -> Arc<LearnerModuleSession> {
        Arc::clone(&self.session)
    }

    #[must_use]
    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    #[must_use]
    pub fn static_sequence(&self) -> &[StaticLearningUnit] {
        &self.static_sequence
    }

    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Strategy input assembled from the current state.
    #[must_use]
    pub fn context(&self) -> PlaylistContext<'_> {
        PlaylistContext {
            static_sequence: &self.static_sequence,
            playlist: &self.session.playlist,
            current_index: self.session.current_index,
            node_progress: &self.session.node_progress,
            gate_results: &self.session.gate_results,
            adaptive_config: &self.config,
        }
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<&PlaylistEntry> {
        self.session.current_entry()
    }

    /// Snapshot wrapped for the persistence boundary.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession::new(LearnerModuleSession::clone(&self.session))
    }

    // =========================================================================
    // PLAYLIST LIFECYCLE
    // =========================================================================

    /// Rebuild the playlist from the static sequence and return to the start.
    ///
    /// Injected entries are dropped; mastery and gate history are kept.
    pub fn initialize_playlist(&mut self) -> Arc<LearnerModuleSession> {
        let playlist: Vec<PlaylistEntry> = self
            .static_sequence
            .iter()
            .cloned()
            .map(PlaylistEntry::Static)
            .collect();

        let session = Arc::make_mut(&mut self.session);
        session.playlist = playlist;
        session.current_index = 0;
        session.is_complete = false;

        tracing::debug!(
            enrollment = %session.enrollment_id,
            module = %session.module_id,
            entries = session.playlist.len(),
            strategy = self.strategy.name(),
            "initialized playlist"
        );
        self.session()
    }

    // =========================================================================
    // DECISIONS
    // =========================================================================

    /// Ask the strategy what comes next. Does not change state.
    #[must_use]
    pub fn resolve_next(&self) -> PlaylistDecision {
        self.strategy.resolve_next(&self.context())
    }

    /// Apply a decision to the session and return the new snapshot.
    pub fn apply_decision(&mut self, decision: &PlaylistDecision) -> Arc<LearnerModuleSession> {
        let session = Arc::make_mut(&mut self.session);
        let before = session.current_index;

        match decision {
            PlaylistDecision::Advance | PlaylistDecision::Skip { .. } => {
                session.current_index = advanced(session);
            }
            PlaylistDecision::Complete => {
                session.is_complete = true;
            }
            PlaylistDecision::Hold { .. } | PlaylistDecision::Retry { .. } => {}
            PlaylistDecision::Inject { entries } => {
                let present = entry_ids(&session.playlist);
                let fresh: Vec<PlaylistEntry> = entries
                    .iter()
                    .filter(|e| !present.contains(&e.id()))
                    .cloned()
                    .collect();
                let at = session
                    .current_index
                    .saturating_add(1)
                    .min(session.playlist.len());
                let spliced = fresh.len();
                session.playlist.splice(at..at, fresh);
                session.current_index = at;

                if spliced < entries.len() {
                    tracing::debug!(
                        duplicates = entries.len() - spliced,
                        "skipped injected entries already in playlist"
                    );
                }
            }
        }

        tracing::debug!(
            action = decision.action(),
            from = before,
            to = session.current_index,
            complete = session.is_complete,
            "applied playlist decision"
        );
        self.session()
    }

    /// Resolve the next decision and apply it in one call.
    pub fn step(&mut self) -> (PlaylistDecision, Arc<LearnerModuleSession>) {
        let decision = self.resolve_next();
        let session = self.apply_decision(&decision);
        (decision, session)
    }

    // =========================================================================
    // RECORDERS
    // =========================================================================

    /// Append a gate attempt to its unit's history.
    pub fn record_gate_result(&mut self, result: GateResult) -> Arc<LearnerModuleSession> {
        let session = Arc::make_mut(&mut self.session);
        tracing::debug!(
            gate = %result.lu_id,
            passed = result.passed,
            attempt = result.attempt_number,
            failed_nodes = result.failed_nodes.len(),
            "recorded gate result"
        );
        session
            .gate_results
            .entry(result.lu_id.clone())
            .or_default()
            .push(result);
        self.session()
    }

    /// Insert or replace a node's progress. Mastery is clamped into `[0, 1]`.
    pub fn update_node_progress(
        &mut self,
        node_id: NodeId,
        progress: NodeProgress,
    ) -> Arc<LearnerModuleSession> {
        let progress = NodeProgress::new(progress.mastery, progress.attempts);
        let session = Arc::make_mut(&mut self.session);
        tracing::debug!(node = %node_id, mastery = progress.mastery, "updated node progress");
        session.node_progress.insert(node_id, progress);
        self.session()
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Index of the first entry, at or after the current one, that stops
    /// forward movement. Equals the playlist length when nothing blocks.
    ///
    /// A gate whose remediation is already in the playlist does not block.
    #[must_use]
    pub fn navigation_limit(&self) -> usize {
        let ctx = self.context();
        let present = entry_ids(ctx.playlist);
        (ctx.current_index..ctx.playlist.len())
            .find(|&i| blocks(&self.strategy.resolve_next(&ctx.at(i)), &present))
            .unwrap_or(ctx.playlist.len())
    }

    /// Jump directly to an entry, e.g. from a sidebar click.
    ///
    /// Policy:
    /// - out-of-range targets are ignored
    /// - moving back (or staying put) is always allowed; moving back also
    ///   reopens a completed session
    /// - moving forward requires `allow_learner_choice` and stops at the first
    ///   unresolved gate (see [`navigation_limit`](Self::navigation_limit))
    pub fn go_to_index(&mut self, index: usize) -> Arc<LearnerModuleSession> {
        let current = self.session.current_index;
        if index >= self.session.playlist.len() || index == current {
            return self.session();
        }

        let target = if index < current {
            index
        } else if !self.config.allow_learner_choice {
            tracing::debug!(requested = index, "forward navigation disabled for this course");
            current
        } else {
            let limit = self.navigation_limit();
            if index > limit {
                tracing::debug!(requested = index, limit, "navigation stopped at unresolved gate");
            }
            index.min(limit)
        };

        if target != current {
            let session = Arc::make_mut(&mut self.session);
            session.current_index = target;
            if target < current {
                session.is_complete = false;
            }
        }
        self.session()
    }

    // =========================================================================
    // DISPLAY
    // =========================================================================

    /// Sidebar rows for the whole playlist.
    #[must_use]
    pub fn display_entries(&self) -> Vec<DisplayEntry> {
        let session = &self.session;
        let limit = self.navigation_limit();

        session
            .playlist
            .iter()
            .enumerate()
            .map(|(index, entry)| DisplayEntry {
                index,
                entry_id: entry.id(),
                title: entry.title(),
                kind: entry.kind(),
                is_gate: entry.is_gate(),
                is_current: index == session.current_index && !session.is_complete,
                is_completed: session.is_complete || index < session.current_index,
                is_locked: index > limit,
            })
            .collect()
    }
}

fn sorted(mut units: Vec<StaticLearningUnit>) -> Vec<StaticLearningUnit> {
    units.sort_by(|a, b| a.sequence.cmp(&b.sequence).then_with(|| a.id.cmp(&b.id)));
    units
}

fn normalized(progress: BTreeMap<NodeId, NodeProgress>) -> BTreeMap<NodeId, NodeProgress> {
    progress
        .into_iter()
        .map(|(node, p)| (node, NodeProgress::new(p.mastery, p.attempts)))
        .collect()
}

fn entry_ids(playlist: &[PlaylistEntry]) -> BTreeSet<String> {
    playlist.iter().map(PlaylistEntry::id).collect()
}

/// Blocking decisions stop navigation, except an injection whose entries are
/// all spliced in already.
fn blocks(decision: &PlaylistDecision, present: &BTreeSet<String>) -> bool {
    match decision {
        PlaylistDecision::Inject { entries } => {
            entries.iter().any(|entry| !present.contains(&entry.id()))
        }
        other => other.is_blocking(),
    }
}

fn advanced(session: &LearnerModuleSession) -> usize {
    session
        .current_index
        .saturating_add(1)
        .min(session.playlist.len())
}

// =============================================================================
// TESTS
// =============================================================================
