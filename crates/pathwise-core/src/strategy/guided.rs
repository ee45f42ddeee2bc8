//! Gate-respecting strategy without content injection.

use super::gate::{self, GateStatus};
use super::{SequencingStrategy, advance_or_complete};
use crate::{FailStrategy, PlaylistContext, PlaylistDecision, PlaylistEntry};

/// Respects gates; every fail strategy other than `allow-continue` degrades
/// to `hold`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuidedStrategy;

impl SequencingStrategy for GuidedStrategy {
    fn name(&self) -> &'static str {
        "guided"
    }

    fn resolve_next(&self, ctx: &PlaylistContext<'_>) -> PlaylistDecision {
        let Some(PlaylistEntry::Static(unit)) = ctx.current_entry() else {
            return advance_or_complete(ctx);
        };

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
                attempts_used,
                ..
            } => match config.fail_strategy {
                FailStrategy::AllowContinue => advance_or_complete(ctx),
                FailStrategy::Hold | FailStrategy::InjectPractice | FailStrategy::PrescribeReview => {
                    tracing::trace!(
                        gate = %unit.id,
                        fail_strategy = config.fail_strategy.as_str(),
                        "guided strategy holds at exhausted gate"
                    );
                    PlaylistDecision::Hold {
                        message: gate::exhausted_message(unit, attempts_used),
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixtures::{Fixture, gate, node_list, topic};
    use crate::{GateResult, LearningUnitId, UNLIMITED_RETRIES};

    #[test]
    fn single_failure_with_budget_retries() {
        let mut fixture =
            Fixture::with_units(vec![gate("gate-1", 1, 3, FailStrategy::Hold), topic("b", 2)]);
        fixture.record(GateResult::failed("gate-1", 0.4, 1, node_list(&["n1"])));

        assert_eq!(
            GuidedStrategy.resolve_next(&fixture.ctx(0)),
            PlaylistDecision::Retry {
                lu_id: LearningUnitId::new("gate-1")
            }
        );
    }

    #[test]
    fn unattempted_gate_holds_with_unit_title() {
        let fixture = Fixture::with_units(vec![gate("gate-1", 1, 3, FailStrategy::Hold), topic("b", 2)]);
        let decision = GuidedStrategy.resolve_next(&fixture.ctx(0));
        assert!(
            matches!(&decision, PlaylistDecision::Hold { message } if message.contains("Gate gate-1"))
        );
    }

    #[test]
    fn passed_gate_advances() {
        let mut fixture = Fixture::with_units(vec![gate("g", 1, 1, FailStrategy::Hold), topic("b", 2)]);
        fixture.record(GateResult::passed("g", 0.95, 1));
        assert_eq!(
            GuidedStrategy.resolve_next(&fixture.ctx(0)),
            PlaylistDecision::Advance
        );
    }

    #[test]
    fn injection_strategies_degrade_to_hold() {
        for fail in [
            FailStrategy::Hold,
            FailStrategy::InjectPractice,
            FailStrategy::PrescribeReview,
        ] {
            let mut fixture = Fixture::with_units(vec![gate("g", 1, 1, fail), topic("b", 2)]);
            fixture.record(GateResult::failed("g", 0.2, 1, node_list(&["n1"])));
            let decision = GuidedStrategy.resolve_next(&fixture.ctx(0));
            assert_eq!(decision.action(), "hold", "fail strategy {:?}", fail);
        }
    }

    #[test]
    fn allow_continue_advances_after_exhaustion() {
        let mut fixture =
            Fixture::with_units(vec![gate("g", 1, 0, FailStrategy::AllowContinue), topic("b", 2)]);
        fixture.record(GateResult::failed("g", 0.2, 1, Vec::new()));
        assert_eq!(
            GuidedStrategy.resolve_next(&fixture.ctx(0)),
            PlaylistDecision::Advance
        );
    }

    #[test]
    fn unlimited_retries_keep_retrying() {
        let mut fixture =
            Fixture::with_units(vec![gate("g", 1, UNLIMITED_RETRIES, FailStrategy::Hold)]);
        for attempt in 1..=25 {
            fixture.record(GateResult::failed("g", 0.1, attempt, Vec::new()));
        }
        assert_eq!(GuidedStrategy.resolve_next(&fixture.ctx(0)).action(), "retry");
    }

    #[test]
    fn skippable_units_are_not_skipped() {
        let mut fixture = Fixture::with_units(vec![
            crate::strategy::fixtures::skippable("s", 1, &["n1"]),
            topic("b", 2),
        ]);
        fixture.mastery("n1", 1.0);
        assert_eq!(
            GuidedStrategy.resolve_next(&fixture.ctx(0)),
            PlaylistDecision::Advance
        );
    }
}
