//! Core data structs for the Bakunawa round engine.
//!
//! Covers the initiative roll result, the two effect catalogs' entry types,
//! the per-round history record, and the persisted match snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EffectCategory, EffectType, MoonType, Team};
use crate::ids::MatchId;

// ---------------------------------------------------------------------------
// Initiative
// ---------------------------------------------------------------------------

/// Outcome of one paired initiative roll.
///
/// The winner is the team with the higher die. On a tie `is_tie` is set and
/// `winner` defaults to [`Team::Bakunawa`]; callers must check
/// [`is_tie`](Self::is_tie) before trusting [`winner`](Self::winner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DiceRollResult {
    /// Team A's die.
    roll_a: i32,
    /// Team B's die.
    roll_b: i32,
    /// Higher roller, or team A on a tie.
    winner: Team,
    /// Whether both dice show the same value.
    is_tie: bool,
}

impl DiceRollResult {
    /// Build a result from the two dice values.
    pub const fn new(roll_a: i32, roll_b: i32) -> Self {
        let (winner, is_tie) = if roll_a > roll_b {
            (Team::Bakunawa, false)
        } else if roll_b > roll_a {
            (Team::Tribesmen, false)
        } else {
            (Team::Bakunawa, true)
        };
        Self {
            roll_a,
            roll_b,
            winner,
            is_tie,
        }
    }

    /// Team A's die value.
    pub const fn roll_a(&self) -> i32 {
        self.roll_a
    }

    /// Team B's die value.
    pub const fn roll_b(&self) -> i32 {
        self.roll_b
    }

    /// Initiative winner (team A on a tie).
    pub const fn winner(&self) -> Team {
        self.winner
    }

    /// Whether the roll was a tie.
    pub const fn is_tie(&self) -> bool {
        self.is_tie
    }

    /// Initiative holder, or `None` on a tie.
    pub const fn initiative(&self) -> Option<Team> {
        if self.is_tie { None } else { Some(self.winner) }
    }
}

// ---------------------------------------------------------------------------
// Moon's Judgment
// ---------------------------------------------------------------------------

/// A one-shot Moon's Judgment effect from the catalog.
///
/// Only [`favor_modifier`](Self::favor_modifier) feeds back into the engine;
/// the remaining modifiers are carried for the card layer and presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MoonEffect {
    /// Display name.
    pub name: String,
    /// Rules text shown to players.
    #[serde(default)]
    pub description: String,
    /// Pool this effect is drawn from.
    pub moon_type: MoonType,
    /// Classification for display.
    pub effect_type: EffectType,
    /// Informational duration in rounds. Not consumed by the engine.
    #[serde(default = "default_moon_duration")]
    pub duration: u32,
    /// Energy gained or lost.
    #[serde(default)]
    pub energy_change: i32,
    /// Attack modifier for the next card played.
    #[serde(default)]
    pub attack_modifier: i32,
    /// Defense modifier for the next card played.
    #[serde(default)]
    pub defense_modifier: i32,
    /// Favor adjustment applied when the effect resolves.
    #[serde(default)]
    pub favor_modifier: i32,
    /// Free-form condition text for the card layer.
    #[serde(default)]
    pub special_condition: Option<String>,
}

const fn default_moon_duration() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Celestial Phenomena
// ---------------------------------------------------------------------------

/// A multi-round Celestial Phenomenon from the catalog.
///
/// `trigger_threshold` is compared against both the signed and the absolute
/// favor value during selection. Catalog entries are always inactive; only
/// the copy held by the phenomena system has `is_active` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PhenomenonEffect {
    /// Display name.
    pub name: String,
    /// Rules text shown to players.
    #[serde(default)]
    pub description: String,
    /// Number of round advances the phenomenon stays active.
    #[serde(default = "default_phenomenon_duration")]
    pub duration: u32,
    /// Favor value that makes this phenomenon eligible.
    pub trigger_threshold: i32,
    /// Card category the phenomenon targets.
    pub effect_category: EffectCategory,
    /// Whether this copy is the currently active phenomenon.
    #[serde(default)]
    pub is_active: bool,
}

const fn default_phenomenon_duration() -> u32 {
    2
}

impl PhenomenonEffect {
    /// Whether this phenomenon may be selected at the given favor value.
    pub const fn is_eligible(&self, favor: i32) -> bool {
        self.trigger_threshold == favor || self.trigger_threshold == favor.saturating_abs()
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Immutable summary of one resolved round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RoundRecord {
    /// Round number (1-based).
    pub round_number: u32,
    /// Initiative roll for the round, if one was taken.
    pub dice_result: Option<DiceRollResult>,
    /// Round winner, or `None` for a drawn round.
    pub round_winner: Option<Team>,
    /// Whether Moon's Judgment applied an effect this round.
    pub moon_judgment_triggered: bool,
    /// Whether a Celestial Phenomenon was applied this round.
    pub phenomenon_triggered: bool,
    /// Name of the Moon effect applied this round.
    pub active_moon_effect_name: Option<String>,
    /// Name of the phenomenon active when the round resolved.
    pub active_phenomenon_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Persistable summary of a match in progress.
///
/// Written and read by the external save/load collaborator; the engine only
/// produces and consumes the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MatchSnapshot {
    /// Match the snapshot was taken from.
    pub match_id: MatchId,
    /// Current round number.
    pub current_round: u32,
    /// Favor meter value.
    pub favor: i32,
    /// Name of the active phenomenon, if any.
    pub active_phenomenon_name: Option<String>,
    /// Rounds left on the active phenomenon.
    pub phenomenon_duration: u32,
    /// Name of the most recent Moon effect, if any.
    pub last_moon_effect_name: Option<String>,
    /// Resolved rounds, oldest first.
    #[serde(default)]
    pub history: Vec<RoundRecord>,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn higher_die_wins_initiative() {
        let result = DiceRollResult::new(5, 2);
        assert_eq!(result.winner(), Team::Bakunawa);
        assert!(!result.is_tie());

        let result = DiceRollResult::new(1, 6);
        assert_eq!(result.winner(), Team::Tribesmen);
        assert_eq!(result.initiative(), Some(Team::Tribesmen));
    }

    #[test]
    fn tie_defaults_winner_to_team_a() {
        let result = DiceRollResult::new(4, 4);
        assert!(result.is_tie());
        assert_eq!(result.winner(), Team::Bakunawa);
        assert_eq!(result.initiative(), None);
    }

    #[test]
    fn phenomenon_matches_signed_and_absolute_favor() {
        let effect = PhenomenonEffect {
            name: String::from("Shadow Veil"),
            description: String::new(),
            duration: 2,
            trigger_threshold: 4,
            effect_category: EffectCategory::Support,
            is_active: false,
        };
        assert!(effect.is_eligible(4));
        assert!(effect.is_eligible(-4));
        assert!(!effect.is_eligible(2));
    }

    #[test]
    fn moon_effect_yaml_defaults() {
        let json = r#"{"name":"Blank Fate","moon_type":"Normal","effect_type":"Neutral"}"#;
        let effect: MoonEffect = serde_json::from_str(json).unwrap();
        assert_eq!(effect.duration, 1);
        assert_eq!(effect.favor_modifier, 0);
        assert!(effect.description.is_empty());
        assert!(effect.special_condition.is_none());
    }
}
