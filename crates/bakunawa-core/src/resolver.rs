//! Round resolver trait and stub implementations.
//!
//! During RoundResolution the engine asks a [`RoundResolver`] who won the
//! round. Card-clash resolution lives outside the engine; until a real
//! resolver is plugged in, [`CoinFlipResolver`] picks a winner at random.

use std::collections::VecDeque;

use bakunawa_types::{DiceRollResult, Team};

use crate::random::RandomSource;

/// What the engine knows about the round being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundContext {
    /// Round number.
    pub round: u32,
    /// Favor before the round result is applied.
    pub favor: i32,
    /// Initiative roll, if one was made this round.
    pub dice: Option<DiceRollResult>,
}

/// A source of round results.
pub trait RoundResolver: Send {
    /// Winner of the round, or `None` for a drawn round.
    fn resolve_round(&mut self, context: &RoundContext, rng: &mut dyn RandomSource)
    -> Option<Team>;
}

/// Picks either team with equal probability. Never draws.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinFlipResolver;

impl CoinFlipResolver {
    /// Create a new coin-flip resolver.
    pub const fn new() -> Self {
        Self
    }
}

impl RoundResolver for CoinFlipResolver {
    fn resolve_round(
        &mut self,
        _context: &RoundContext,
        rng: &mut dyn RandomSource,
    ) -> Option<Team> {
        if rng.range_inclusive(0, 1) == 0 {
            Some(Team::Bakunawa)
        } else {
            Some(Team::Tribesmen)
        }
    }
}

/// Replays a fixed list of round results, then falls back to coin flips.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResolver {
    outcomes: VecDeque<Option<Team>>,
}

impl ScriptedResolver {
    /// A resolver returning `outcomes` in order.
    pub fn new(outcomes: impl IntoIterator<Item = Option<Team>>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
        }
    }

    /// Scripted results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }
}

impl RoundResolver for ScriptedResolver {
    fn resolve_round(
        &mut self,
        context: &RoundContext,
        rng: &mut dyn RandomSource,
    ) -> Option<Team> {
        match self.outcomes.pop_front() {
            Some(outcome) => outcome,
            None => CoinFlipResolver.resolve_round(context, rng),
        }
    }
}
