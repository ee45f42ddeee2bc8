//! Passthrough strategy: the playlist is played in order, adaptive metadata
//! is inert.

use super::{SequencingStrategy, advance_or_complete};
use crate::{PlaylistContext, PlaylistDecision};

/// The "adaptivity off" strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticStrategy;

impl SequencingStrategy for StaticStrategy {
    fn name(&self) -> &'static str {
        "static"
    }

    fn resolve_next(&self, ctx: &PlaylistContext<'_>) -> PlaylistDecision {
        advance_or_complete(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FailStrategy;
    use crate::strategy::fixtures::{Fixture, gate, topic};

    #[test]
    fn advances_until_last_entry() {
        let fixture = Fixture::with_units(vec![topic("a", 1), topic("b", 2), topic("c", 3)]);
        assert_eq!(
            StaticStrategy.resolve_next(&fixture.ctx(0)),
            PlaylistDecision::Advance
        );
        assert_eq!(
            StaticStrategy.resolve_next(&fixture.ctx(1)),
            PlaylistDecision::Advance
        );
        assert_eq!(
            StaticStrategy.resolve_next(&fixture.ctx(2)),
            PlaylistDecision::Complete
        );
        assert_eq!(
            StaticStrategy.resolve_next(&fixture.ctx(7)),
            PlaylistDecision::Complete
        );
    }

    #[test]
    fn gate_metadata_is_inert() {
        let fixture = Fixture::with_units(vec![
            gate("gate-1", 1, 0, FailStrategy::Hold),
            gate("gate-2", 2, 0, FailStrategy::InjectPractice),
        ]);
        assert_eq!(
            StaticStrategy.resolve_next(&fixture.ctx(0)),
            PlaylistDecision::Advance
        );
        assert_eq!(
            StaticStrategy.resolve_next(&fixture.ctx(1)),
            PlaylistDecision::Complete
        );
    }
}
