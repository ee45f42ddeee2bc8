//! Gate evaluation shared by the gate-respecting strategies.

use crate::{GateConfig, GateResult, PlaylistContext, StaticLearningUnit};

/// Where a learner stands with respect to the gate in the current slot.
#[derive(Debug)]
pub(crate) enum GateStatus<'a> {
    /// Not a gate, or a gate flag without configuration.
    Open,
    /// No attempt recorded yet.
    Pending,
    Passed,
    /// Latest attempt failed; another attempt is allowed.
    RetryAvailable,
    /// Latest attempt failed and the retry budget is spent.
    Exhausted {
        config: &'a GateConfig,
        latest: &'a GateResult,
        attempts_used: usize,
    },
}

/// Classify `unit` against the attempt history in `ctx`.
///
/// Only the latest attempt decides pass/fail; every attempt counts toward
/// the retry budget.
pub(crate) fn evaluate<'a>(ctx: &PlaylistContext<'a>, unit: &'a StaticLearningUnit) -> GateStatus<'a> {
    let Some(config) = unit.gate_config() else {
        return GateStatus::Open;
    };
    let Some(latest) = ctx.latest_gate_result(&unit.id) else {
        return GateStatus::Pending;
    };
    if latest.passed {
        return GateStatus::Passed;
    }

    let attempts_used = ctx.attempts_used(&unit.id);
    if config.allows_retry(attempts_used) {
        GateStatus::RetryAvailable
    } else {
        GateStatus::Exhausted {
            config,
            latest,
            attempts_used,
        }
    }
}

/// Hold message for a gate with no attempt yet.
pub(crate) fn pending_message(unit: &StaticLearningUnit) -> String {
    format!("Complete the gate \"{}\" to continue", unit.title)
}

/// Hold message for a gate whose retries are used up.
pub(crate) fn exhausted_message(unit: &StaticLearningUnit, attempts_used: usize) -> String {
    format!(
        "Gate \"{}\" was not passed after {} attempt(s); contact your instructor to continue",
        unit.title, attempts_used
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixtures::{Fixture, gate, node_list, topic};
    use crate::{FailStrategy, GateResult};

    #[test]
    fn non_gate_is_open() {
        let fixture = Fixture::with_units(vec![topic("a", 1)]);
        let unit = &fixture.units[0];
        assert!(matches!(evaluate(&fixture.ctx(0), unit), GateStatus::Open));
    }

    #[test]
    fn latest_attempt_decides_pass() {
        let mut fixture = Fixture::with_units(vec![gate("g", 1, 3, FailStrategy::Hold)]);
        fixture.record(GateResult::failed("g", 0.4, 1, node_list(&["n"])));
        fixture.record(GateResult::passed("g", 0.9, 2));
        let unit = &fixture.units[0];
        assert!(matches!(evaluate(&fixture.ctx(0), unit), GateStatus::Passed));
    }

    #[test]
    fn exhausted_reports_all_attempts() {
        let mut fixture = Fixture::with_units(vec![gate("g", 1, 2, FailStrategy::Hold)]);
        fixture.record(GateResult::failed("g", 0.4, 1, Vec::new()));
        fixture.record(GateResult::failed("g", 0.5, 2, Vec::new()));
        let unit = &fixture.units[0];
        assert!(matches!(
            evaluate(&fixture.ctx(0), unit),
            GateStatus::Exhausted {
                attempts_used: 2,
                ..
            }
        ));
    }

    #[test]
    fn messages_name_the_unit() {
        let unit = gate("g", 1, 1, FailStrategy::Hold);
        assert!(pending_message(&unit).contains("Gate g"));
        assert!(exhausted_message(&unit, 3).contains("3 attempt(s)"));
    }
}
