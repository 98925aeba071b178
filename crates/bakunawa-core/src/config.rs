//! Configuration loading and typed config structures for the round engine.
//!
//! The canonical configuration lives in `bakunawa-config.yaml` next to the
//! binary. Every field has a default matching the tabletop rules, so an
//! empty file (or no file at all) yields a playable match.
//!
//! Configuration is validated once, when the engine is built. Nothing in
//! this module is consulted for correctness mid-round.

use std::path::{Path, PathBuf};

use bakunawa_types::Team;
use serde::Deserialize;

/// Environment variable overriding `random.seed`.
pub const SEED_ENV_VAR: &str = "BAKUNAWA_SEED";

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The effect catalog handed to the engine has an unusable entry.
    #[error("invalid effect catalog: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: crate::catalog::CatalogError,
    },

    /// The configuration parsed but describes an unplayable match.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `bakunawa-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Round count, Moon's Judgment schedule, and tie-break handling.
    #[serde(default)]
    pub rounds: RoundsConfig,

    /// Favor meter bounds and phenomenon thresholds.
    #[serde(default)]
    pub favor: FavorConfig,

    /// Phase window lengths and the time unit they are measured in.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Initiative dice faces.
    #[serde(default)]
    pub dice: DiceConfig,

    /// Random number generation.
    #[serde(default)]
    pub random: RandomConfig,

    /// Optional external files.
    #[serde(default)]
    pub files: FilesConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `BAKUNAWA_SEED` overrides `random.seed`. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.random.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a playable match.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounds.max_rounds < 1 {
            return Err(invalid("rounds.max_rounds must be at least 1"));
        }
        let round_cap = self.rounds.tiebreak.round_cap();
        if round_cap < self.rounds.max_rounds {
            return Err(invalid(format!(
                "rounds.tiebreak.round_cap ({round_cap}) must not be below rounds.max_rounds ({})",
                self.rounds.max_rounds
            )));
        }
        if self.favor.min >= self.favor.max {
            return Err(invalid(format!(
                "favor range [{}, {}] is empty",
                self.favor.min, self.favor.max
            )));
        }
        if self.favor.min > 0 || self.favor.max < 0 {
            return Err(invalid(format!(
                "favor range [{}, {}] must contain the neutral value 0",
                self.favor.min, self.favor.max
            )));
        }
        if self.timing.time_unit_ms == 0 {
            return Err(invalid("timing.time_unit_ms must be at least 1"));
        }
        if self.dice.min > self.dice.max {
            return Err(invalid(format!(
                "dice range [{}, {}] is empty",
                self.dice.min, self.dice.max
            )));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

/// What happens when regulation rounds end with the favor meter at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TiebreakPolicy {
    /// Keep playing extra rounds while favor is zero. If the cap round
    /// also ends at zero, `cap_winner` takes the match.
    ExtraRounds {
        /// Last round that may be played.
        #[serde(default = "default_round_cap")]
        round_cap: u32,
        /// Match winner when the cap round ends at zero favor.
        #[serde(default = "default_cap_winner")]
        cap_winner: Team,
    },
    /// The first extra round with a round winner decides the match. If the
    /// cap round is still undecided, `cap_winner` takes the match.
    SuddenDeath {
        /// Last round that may be played.
        #[serde(default = "default_round_cap")]
        round_cap: u32,
        /// Match winner when the cap round is drawn.
        #[serde(default = "default_cap_winner")]
        cap_winner: Team,
    },
}

impl TiebreakPolicy {
    /// Last round that may be played.
    pub const fn round_cap(&self) -> u32 {
        match *self {
            Self::ExtraRounds { round_cap, .. } | Self::SuddenDeath { round_cap, .. } => round_cap,
        }
    }

    /// Match winner when the cap round ends without a decision.
    pub const fn cap_winner(&self) -> Team {
        match *self {
            Self::ExtraRounds { cap_winner, .. } | Self::SuddenDeath { cap_winner, .. } => {
                cap_winner
            }
        }
    }
}

impl Default for TiebreakPolicy {
    fn default() -> Self {
        Self::ExtraRounds {
            round_cap: default_round_cap(),
            cap_winner: default_cap_winner(),
        }
    }
}

/// Round schedule configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoundsConfig {
    /// Regulation round count.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Rounds on which Moon's Judgment fires.
    #[serde(default = "default_moon_judgment_rounds")]
    pub moon_judgment_rounds: Vec<u32>,

    /// Handling of a zero favor meter after regulation.
    #[serde(default)]
    pub tiebreak: TiebreakPolicy,
}

impl Default for RoundsConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            moon_judgment_rounds: default_moon_judgment_rounds(),
            tiebreak: TiebreakPolicy::default(),
        }
    }
}

impl RoundsConfig {
    /// Whether Moon's Judgment fires on the given round.
    pub fn is_moon_round(&self, round: u32) -> bool {
        self.moon_judgment_rounds.contains(&round)
    }
}

/// Favor meter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FavorConfig {
    /// Lowest favor value (team B's end).
    #[serde(default = "default_favor_min")]
    pub min: i32,

    /// Highest favor value (team A's end).
    #[serde(default = "default_favor_max")]
    pub max: i32,

    /// Favor values at which a Celestial Phenomenon is drawn.
    #[serde(default = "default_phenomenon_thresholds")]
    pub phenomenon_thresholds: Vec<i32>,
}

impl Default for FavorConfig {
    fn default() -> Self {
        Self {
            min: default_favor_min(),
            max: default_favor_max(),
            phenomenon_thresholds: default_phenomenon_thresholds(),
        }
    }
}

impl FavorConfig {
    /// Whether a Celestial Phenomenon should be drawn at this favor value.
    pub fn is_phenomenon_trigger(&self, favor: i32) -> bool {
        self.phenomenon_thresholds
            .iter()
            .any(|&t| t == favor || t == favor.saturating_abs())
    }
}

/// Phase timing configuration. Durations are in time units.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Real-time milliseconds per time unit.
    #[serde(default = "default_time_unit_ms")]
    pub time_unit_ms: u64,

    /// Card selection window.
    #[serde(default = "default_strategy_phase_duration")]
    pub strategy_phase_duration: u32,

    /// Card clash window.
    #[serde(default = "default_card_clashing_duration")]
    pub card_clashing_duration: u32,

    /// Pause between consecutive phases.
    #[serde(default = "default_phase_transition_delay")]
    pub phase_transition_delay: u32,

    /// Round announcement window.
    #[serde(default = "default_round_start_duration")]
    pub round_start_duration: u32,

    /// Dice roll window, during which another roll is refused.
    #[serde(default = "default_dice_roll_duration")]
    pub dice_roll_duration: u32,

    /// Reveal window after each triggered event, one per event.
    #[serde(default = "default_event_reveal_duration")]
    pub event_reveal_duration: u32,

    /// Event check window when neither event system fires.
    #[serde(default = "default_no_event_duration")]
    pub no_event_duration: u32,

    /// Window after the round winner is announced.
    #[serde(default = "default_resolution_duration")]
    pub resolution_duration: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            time_unit_ms: default_time_unit_ms(),
            strategy_phase_duration: default_strategy_phase_duration(),
            card_clashing_duration: default_card_clashing_duration(),
            phase_transition_delay: default_phase_transition_delay(),
            round_start_duration: default_round_start_duration(),
            dice_roll_duration: default_dice_roll_duration(),
            event_reveal_duration: default_event_reveal_duration(),
            no_event_duration: default_no_event_duration(),
            resolution_duration: default_resolution_duration(),
        }
    }
}

impl TimingConfig {
    /// A timing profile with every window and delay set to zero.
    pub const fn instant() -> Self {
        Self {
            time_unit_ms: 1,
            strategy_phase_duration: 0,
            card_clashing_duration: 0,
            phase_transition_delay: 0,
            round_start_duration: 0,
            dice_roll_duration: 0,
            event_reveal_duration: 0,
            no_event_duration: 0,
            resolution_duration: 0,
        }
    }
}

/// Initiative dice configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DiceConfig {
    /// Lowest face.
    #[serde(default = "default_dice_min")]
    pub min: i32,

    /// Highest face.
    #[serde(default = "default_dice_max")]
    pub max: i32,
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            min: default_dice_min(),
            max: default_dice_max(),
        }
    }
}

/// Random number generation configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RandomConfig {
    /// Fixed seed for reproducible matches. Entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RandomConfig {
    /// Apply the `BAKUNAWA_SEED` environment override, if set and numeric.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SEED_ENV_VAR) {
            match val.parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(e) => tracing::warn!(value = %val, error = %e, "Ignoring non-numeric seed override"),
            }
        }
    }
}

/// Optional external file locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FilesConfig {
    /// YAML effect catalog. Built-in defaults are used when absent.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Where to write the final match snapshot as JSON.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_max_rounds() -> u32 {
    10
}

fn default_moon_judgment_rounds() -> Vec<u32> {
    vec![3, 5, 7, 9]
}

const fn default_round_cap() -> u32 {
    11
}

const fn default_cap_winner() -> Team {
    Team::Bakunawa
}

const fn default_favor_min() -> i32 {
    -5
}

const fn default_favor_max() -> i32 {
    5
}

fn default_phenomenon_thresholds() -> Vec<i32> {
    vec![-4, -2, 2, 4]
}

const fn default_time_unit_ms() -> u64 {
    1000
}

const fn default_strategy_phase_duration() -> u32 {
    90
}

const fn default_card_clashing_duration() -> u32 {
    5
}

const fn default_phase_transition_delay() -> u32 {
    2
}

const fn default_round_start_duration() -> u32 {
    1
}

const fn default_dice_roll_duration() -> u32 {
    2
}

const fn default_event_reveal_duration() -> u32 {
    3
}

const fn default_no_event_duration() -> u32 {
    1
}

const fn default_resolution_duration() -> u32 {
    2
}

const fn default_dice_min() -> i32 {
    1
}

const fn default_dice_max() -> i32 {
    6
}
