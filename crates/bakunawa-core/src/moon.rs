//! Moon's Judgment: a one-shot effect drawn on designated rounds.
//!
//! The pool depends on how the previous round ended. A drawn round sends
//! the draw to the Neutral pool, any decided round to the Normal pool.
//! Effects are instantaneous; only a non-zero `favor_modifier` changes
//! engine state.

use bakunawa_events::EventBus;
use bakunawa_types::{MatchEvent, MoonEffect, Team};
use tracing::info;

use crate::catalog::EffectCatalog;
use crate::favor::FavorTrack;
use crate::random::RandomSource;

/// Moon's Judgment state.
#[derive(Debug, Clone, Default)]
pub struct MoonsJudgment {
    last_round_winner: i8,
    current: Option<MoonEffect>,
}

impl MoonsJudgment {
    /// Fresh state: no previous round, no effect applied.
    pub const fn new() -> Self {
        Self {
            last_round_winner: 0,
            current: None,
        }
    }

    /// Record the previous round's outcome: `1` team A, `-1` team B, `0` drawn.
    ///
    /// Any other value is reduced to its sign.
    pub const fn set_last_round_winner(&mut self, outcome: i8) {
        self.last_round_winner = outcome.signum();
    }

    /// Record the previous round's winner, `None` for a drawn round.
    pub const fn record_round(&mut self, winner: Option<Team>) {
        self.last_round_winner = match winner {
            Some(team) => team.outcome_code(),
            None => 0,
        };
    }

    /// Outcome classification used for the next draw.
    pub const fn last_round_winner(&self) -> i8 {
        self.last_round_winner
    }

    /// The most recently applied effect.
    pub const fn current_effect(&self) -> Option<&MoonEffect> {
        self.current.as_ref()
    }

    /// Draw and apply an effect.
    ///
    /// Publishes `MoonEffectApplied`, plus `FavorChanged` when the effect's
    /// favor modifier moved the meter. Returns `None` without side effects
    /// when the selected pool is empty.
    pub fn trigger(
        &mut self,
        catalog: &EffectCatalog,
        rng: &mut dyn RandomSource,
        favor: &mut FavorTrack,
        round: u32,
        bus: &mut EventBus,
    ) -> Option<MoonEffect> {
        let effect = catalog.select_moon(self.last_round_winner, rng)?.clone();
        info!(
            round,
            effect = %effect.name,
            last_round_winner = self.last_round_winner,
            "Moon's Judgment applied"
        );
        if effect.favor_modifier != 0 {
            let _ = favor.adjust_and_notify(effect.favor_modifier, bus);
        }
        bus.publish(&MatchEvent::MoonEffectApplied {
            round,
            effect: effect.clone(),
        });
        self.current = Some(effect.clone());
        Some(effect)
    }

    /// Restore the name of a previously applied effect, if the catalog knows it.
    pub fn restore_current(&mut self, catalog: &EffectCatalog, name: &str) {
        self.current = catalog
            .normal_effects()
            .iter()
            .chain(catalog.neutral_effects())
            .find(|e| e.name == name)
            .cloned();
    }

    /// Forget the last outcome and the last applied effect.
    pub fn reset(&mut self) {
        self.last_round_winner = 0;
        self.current = None;
    }
}
