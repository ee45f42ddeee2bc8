//! Full adaptivity: gates, mastery-based skipping and remediation injection.

use super::gate::{self, GateStatus};
use super::{SequencingStrategy, advance_or_complete};
use crate::primitives::{
    DEFAULT_PRACTICE_QUESTION_COUNT, SKIP_MASTERY_THRESHOLD, SKIP_THRESHOLD_LABEL,
};
use crate::{
    FailStrategy, InjectedPractice, InjectedReview, NodeId, PlaylistContext, PlaylistDecision,
    PlaylistEntry, StaticLearningUnit,
};
use std::collections::BTreeSet;

/// Superset of the guided strategy that skips mastered content and injects
/// remediation after exhausted gates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullStrategy;

impl SequencingStrategy for FullStrategy {
    fn name(&self) -> &'static str {
        "full"
    }

    fn resolve_next(&self, ctx: &PlaylistContext<'_>) -> PlaylistDecision {
        let Some(PlaylistEntry::Static(unit)) = ctx.current_entry() else {
            return advance_or_complete(ctx);
        };

        if is_mastered(ctx, unit) {
            return PlaylistDecision::Skip {
                reason: format!(
                    "All nodes taught by \"{}\" meet the {} threshold",
                    unit.title, SKIP_THRESHOLD_LABEL
                ),
            };
        }

        match gate::evaluate(ctx, unit) {
            GateStatus::Open | GateStatus::Passed => advance_or_complete(ctx),
            GateStatus::Pending => PlaylistDecision::Hold {
                message: gate::pending_message(unit),
            },
            GateStatus::RetryAvailable => PlaylistDecision::Retry {
                lu_id: unit.id.clone(),
            },
            GateStatus::Exhausted {
                config,
                latest,
                attempts_used,
            } => {
                let failed = dedup_preserving_order(&latest.failed_nodes);
                match config.fail_strategy {
                    FailStrategy::AllowContinue => advance_or_complete(ctx),
                    FailStrategy::Hold => PlaylistDecision::Hold {
                        message: gate::exhausted_message(unit, attempts_used),
                    },
                    FailStrategy::InjectPractice => {
                        inject_practice(ctx, unit, attempts_used, failed)
                    }
                    FailStrategy::PrescribeReview => {
                        prescribe_review(ctx, unit, attempts_used, failed)
                    }
                }
            }
        }
    }
}

/// A skippable, non-gate unit whose every taught node is mastered.
///
/// Fails closed: no taught nodes, or any node without progress, never skips.
fn is_mastered(ctx: &PlaylistContext<'_>, unit: &StaticLearningUnit) -> bool {
    let Some(profile) = unit.adaptive.as_ref() else {
        return false;
    };
    if !profile.is_skippable || profile.is_gate || profile.teaches_nodes.is_empty() {
        return false;
    }
    profile
        .teaches_nodes
        .iter()
        .all(|node| ctx.mastery(node).is_some_and(|m| m >= SKIP_MASTERY_THRESHOLD))
}

fn dedup_preserving_order(nodes: &[NodeId]) -> Vec<NodeId> {
    let mut seen = BTreeSet::new();
    nodes
        .iter()
        .filter(|n| seen.insert(*n))
        .cloned()
        .collect()
}

/// One practice entry over the failed nodes; nothing to remediate advances.
fn inject_practice(
    ctx: &PlaylistContext<'_>,
    gate_unit: &StaticLearningUnit,
    attempts_used: usize,
    failed: Vec<NodeId>,
) -> PlaylistDecision {
    if failed.is_empty() {
        return advance_or_complete(ctx);
    }
    let practice = InjectedPractice::new(
        &gate_unit.id,
        attempts_used,
        failed,
        DEFAULT_PRACTICE_QUESTION_COUNT,
    );
    PlaylistDecision::Inject {
        entries: vec![PlaylistEntry::InjectedPractice(practice)],
    }
}

/// Review entries for the units that teach the failed nodes, in course order.
///
/// Each failed node is covered at most once. Falls back to a practice entry
/// when no unit teaches any of them.
fn prescribe_review(
    ctx: &PlaylistContext<'_>,
    gate_unit: &StaticLearningUnit,
    attempts_used: usize,
    failed: Vec<NodeId>,
) -> PlaylistDecision {
    let mut uncovered = failed.clone();
    let mut entries = Vec::new();

    for unit in ctx.static_sequence {
        if uncovered.is_empty() {
            break;
        }
        if unit.id == gate_unit.id {
            continue;
        }
        let Some(teaches) = unit.teaches_nodes() else {
            continue;
        };
        let (covered, remaining): (Vec<NodeId>, Vec<NodeId>) =
            uncovered.into_iter().partition(|n| teaches.contains(n));
        uncovered = remaining;
        if !covered.is_empty() {
            entries.push(PlaylistEntry::InjectedReview(InjectedReview::new(
                &gate_unit.id,
                attempts_used,
                unit,
                covered,
            )));
        }
    }

    if entries.is_empty() {
        tracing::trace!(gate = %gate_unit.id, "no teaching unit for failed nodes, prescribing practice");
        return inject_practice(ctx, gate_unit, attempts_used, failed);
    }
    PlaylistDecision::Inject { entries }
}
