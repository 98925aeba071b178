//! Enumeration types for the Bakunawa round engine.
//!
//! Teams, round phases, and the classification tags carried by Moon and
//! Celestial Phenomenon effects.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// One of the two sides of a match.
///
/// The favor meter is signed: positive favor belongs to
/// [`Team::Bakunawa`] (team A), negative favor to [`Team::Tribesmen`]
/// (team B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Team {
    /// Team A, the serpent side. Holds favor when the meter is positive.
    Bakunawa,
    /// Team B, the human side. Holds favor when the meter is negative.
    Tribesmen,
}

impl Team {
    /// Favor step applied when this team wins a round.
    pub const fn favor_step(self) -> i32 {
        match self {
            Self::Bakunawa => 1,
            Self::Tribesmen => -1,
        }
    }

    /// Outcome classification used by Moon's Judgment (`1` or `-1`).
    pub const fn outcome_code(self) -> i8 {
        match self {
            Self::Bakunawa => 1,
            Self::Tribesmen => -1,
        }
    }

    /// The other team.
    pub const fn opponent(self) -> Self {
        match self {
            Self::Bakunawa => Self::Tribesmen,
            Self::Tribesmen => Self::Bakunawa,
        }
    }

    /// The team holding the given favor value, or `None` when it is zero.
    pub const fn holding_favor(favor: i32) -> Option<Self> {
        if favor >= 1 {
            Some(Self::Bakunawa)
        } else if favor <= -1 {
            Some(Self::Tribesmen)
        } else {
            None
        }
    }
}

impl core::fmt::Display for Team {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bakunawa => f.write_str("Bakunawa"),
            Self::Tribesmen => f.write_str("Tribesmen"),
        }
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// A step of the per-round phase sequence.
///
/// Rounds always run `RoundStart -> DiceRoll -> EventCheck ->
/// StrategyPhase -> CardClashing -> RoundResolution`; after resolution the
/// engine either loops back to `RoundStart` or finishes in `GameEnd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// Round bookkeeping and announcement.
    RoundStart,
    /// Initiative dice roll.
    DiceRoll,
    /// Moon's Judgment and Celestial Phenomena checks.
    EventCheck,
    /// Timed planning window for card selection.
    StrategyPhase,
    /// Timed window in which selected cards resolve.
    CardClashing,
    /// Round winner, favor movement, and history append.
    RoundResolution,
    /// Terminal phase; the match has a winner.
    GameEnd,
}

impl Phase {
    /// The phase that follows this one inside a round.
    ///
    /// Returns `None` for [`Phase::RoundResolution`] (the loop-back or
    /// terminal decision belongs to the engine) and for [`Phase::GameEnd`].
    pub const fn next_in_round(self) -> Option<Self> {
        match self {
            Self::RoundStart => Some(Self::DiceRoll),
            Self::DiceRoll => Some(Self::EventCheck),
            Self::EventCheck => Some(Self::StrategyPhase),
            Self::StrategyPhase => Some(Self::CardClashing),
            Self::CardClashing => Some(Self::RoundResolution),
            Self::RoundResolution | Self::GameEnd => None,
        }
    }

    /// Whether this phase exposes a countdown to the presentation layer.
    pub const fn is_countdown(self) -> bool {
        matches!(self, Self::StrategyPhase | Self::CardClashing)
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// Effect classification
// ---------------------------------------------------------------------------

/// Which Moon's Judgment pool an effect belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MoonType {
    /// Drawn after a round with a winner.
    Normal,
    /// Drawn after a drawn round.
    Neutral,
}

/// What a Moon effect does, for display and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EffectType {
    /// Benefits the affected side.
    Buff,
    /// Hinders the affected side.
    Debuff,
    /// Applies to both teams.
    Global,
    /// No mechanical effect.
    Neutral,
}

/// Card category a Celestial Phenomenon targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EffectCategory {
    /// Attack cards.
    Attack,
    /// Defense cards.
    Defense,
    /// Support cards.
    Support,
    /// Every card and both teams.
    Global,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_sequence_is_linear() {
        let mut phase = Phase::RoundStart;
        let mut visited = vec![phase];
        while let Some(next) = phase.next_in_round() {
            visited.push(next);
            phase = next;
        }
        assert_eq!(
            visited,
            vec![
                Phase::RoundStart,
                Phase::DiceRoll,
                Phase::EventCheck,
                Phase::StrategyPhase,
                Phase::CardClashing,
                Phase::RoundResolution,
            ]
        );
        assert_eq!(Phase::GameEnd.next_in_round(), None);
    }

    #[test]
    fn favor_holder_follows_sign() {
        assert_eq!(Team::holding_favor(3), Some(Team::Bakunawa));
        assert_eq!(Team::holding_favor(-1), Some(Team::Tribesmen));
        assert_eq!(Team::holding_favor(0), None);
    }

    #[test]
    fn favor_step_points_toward_winner() {
        assert_eq!(Team::Bakunawa.favor_step(), 1);
        assert_eq!(Team::Tribesmen.favor_step(), -1);
        assert_eq!(Team::Bakunawa.opponent(), Team::Tribesmen);
    }
}
