//! Notifications pushed by the round engine to its collaborators.
//!
//! Presentation, audio, persistence triggers, and the effect history log
//! all consume the same [`MatchEvent`] stream. Nothing flows back: the
//! engine never waits on a listener.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Phase, Team};
use crate::ids::MatchId;
use crate::structs::{DiceRollResult, MoonEffect, PhenomenonEffect};

/// A notification emitted by the round engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchEvent {
    /// A match began at round 1.
    MatchStarted {
        /// The new match.
        match_id: MatchId,
    },
    /// The engine was returned to its initial state.
    MatchReset {
        /// The match that was reset.
        match_id: MatchId,
    },
    /// The engine entered a new phase.
    PhaseChanged {
        /// Round the phase belongs to.
        round: u32,
        /// The phase entered.
        phase: Phase,
    },
    /// One time unit of a countdown window elapsed.
    TimerTick {
        /// Phase the countdown belongs to.
        phase: Phase,
        /// Time units left in the window.
        remaining: u32,
    },
    /// The round counter changed.
    RoundChanged {
        /// The new round number.
        round: u32,
    },
    /// The initiative roll for the round completed.
    DiceRolled {
        /// Round of the roll.
        round: u32,
        /// The roll.
        result: DiceRollResult,
    },
    /// A team won the round.
    RoundWinner {
        /// Round that was won.
        round: u32,
        /// The winner.
        team: Team,
    },
    /// The round ended without a winner.
    RoundDrawn {
        /// Round that was drawn.
        round: u32,
    },
    /// The favor meter moved.
    FavorChanged {
        /// New favor value.
        favor: i32,
    },
    /// The match finished.
    GameWinner {
        /// Match winner.
        team: Team,
        /// Favor at the end of the match.
        final_favor: i32,
    },
    /// Moon's Judgment applied an effect.
    MoonEffectApplied {
        /// Round the effect was applied in.
        round: u32,
        /// The applied effect.
        effect: MoonEffect,
    },
    /// A Celestial Phenomenon became active.
    PhenomenonApplied {
        /// Round the phenomenon was applied in.
        round: u32,
        /// The active phenomenon.
        effect: PhenomenonEffect,
    },
    /// The active phenomenon lost a round of duration.
    PhenomenonCountdown {
        /// Rounds left.
        remaining: u32,
    },
    /// The active phenomenon expired.
    PhenomenonEnded {
        /// Name of the expired phenomenon.
        name: String,
    },
}

impl MatchEvent {
    /// Short machine-readable label, used as a structured log field.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MatchStarted { .. } => "match_started",
            Self::MatchReset { .. } => "match_reset",
            Self::PhaseChanged { .. } => "phase_changed",
            Self::TimerTick { .. } => "timer_tick",
            Self::RoundChanged { .. } => "round_changed",
            Self::DiceRolled { .. } => "dice_rolled",
            Self::RoundWinner { .. } => "round_winner",
            Self::RoundDrawn { .. } => "round_drawn",
            Self::FavorChanged { .. } => "favor_changed",
            Self::GameWinner { .. } => "game_winner",
            Self::MoonEffectApplied { .. } => "moon_effect_applied",
            Self::PhenomenonApplied { .. } => "phenomenon_applied",
            Self::PhenomenonCountdown { .. } => "phenomenon_countdown",
            Self::PhenomenonEnded { .. } => "phenomenon_ended",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = MatchEvent::FavorChanged { favor: -2 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "favor_changed");
        assert_eq!(json["favor"], -2);
        assert_eq!(event.label(), "favor_changed");
    }

    #[test]
    fn phase_event_round_trips() {
        let event = MatchEvent::PhaseChanged {
            round: 3,
            phase: Phase::EventCheck,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: MatchEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
