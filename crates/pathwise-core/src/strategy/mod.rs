//! # Sequencing Strategies
//!
//! A strategy is one pure function: given a [`PlaylistContext`], decide what
//! the learner sees next. Strategies never mutate the context and never fail;
//! every reachable context maps to exactly one [`PlaylistDecision`].
//!
//! | Mode     | Strategy              | Gates | Skip | Injection |
//! |----------|-----------------------|-------|------|-----------|
//! | `off`    | [`StaticStrategy`]    | no    | no   | no        |
//! | `guided` | [`GuidedStrategy`]    | yes   | no   | no        |
//! | `full`   | [`FullStrategy`]      | yes   | yes  | yes       |

mod full;
mod gate;
mod guided;
mod static_order;

pub use full::FullStrategy;
pub use guided::GuidedStrategy;
pub use static_order::StaticStrategy;

use crate::{AdaptiveMode, PlaylistContext, PlaylistDecision};

// =============================================================================
// STRATEGY TRAIT
// =============================================================================

/// The contract every sequencing policy implements.
///
/// Implementations must be deterministic: calling `resolve_next` twice on
/// the same context returns equal decisions.
pub trait SequencingStrategy: Send + Sync + std::fmt::Debug {
    /// Name of the strategy, for logs and status output.
    fn name(&self) -> &'static str;

    /// Decide the next step for the learner.
    fn resolve_next(&self, ctx: &PlaylistContext<'_>) -> PlaylistDecision;
}

/// Select the strategy for a course's adaptive mode.
#[must_use]
pub fn strategy_for_mode(mode: AdaptiveMode) -> Box<dyn SequencingStrategy> {
    match mode {
        AdaptiveMode::Off => Box::new(StaticStrategy),
        AdaptiveMode::Guided => Box::new(GuidedStrategy),
        AdaptiveMode::Full => Box::new(FullStrategy),
    }
}

/// `Advance`, unless the learner is already on (or past) the last entry.
pub(crate) fn advance_or_complete(ctx: &PlaylistContext<'_>) -> PlaylistDecision {
    if ctx.is_last_or_beyond() {
        PlaylistDecision::Complete
    } else {
        PlaylistDecision::Advance
    }
}

// =============================================================================
// TEST FIXTURES
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_selects_strategy() {
        assert_eq!(strategy_for_mode(AdaptiveMode::Off).name(), "static");
        assert_eq!(strategy_for_mode(AdaptiveMode::Guided).name(), "guided");
        assert_eq!(strategy_for_mode(AdaptiveMode::Full).name(), "full");
    }

    #[test]
    fn empty_playlist_completes_in_every_mode() {
        let fixture = fixtures::Fixture::default();
        for mode in [AdaptiveMode::Off, AdaptiveMode::Guided, AdaptiveMode::Full] {
            let decision = strategy_for_mode(mode).resolve_next(&fixture.ctx(0));
            assert_eq!(decision, PlaylistDecision::Complete);
        }
    }
}
