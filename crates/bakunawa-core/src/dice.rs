//! Initiative dice.
//!
//! Each round opens with a paired roll, one die per team. The roller keeps a
//! busy flag for the length of the roll window; a second roll requested
//! before [`DiceRoller::settle`] is refused rather than queued.

use bakunawa_types::DiceRollResult;
use tracing::debug;

use crate::config::DiceConfig;
use crate::random::RandomSource;

/// Paired initiative roller.
#[derive(Debug, Clone)]
pub struct DiceRoller {
    min: i32,
    max: i32,
    rolling: bool,
}

impl DiceRoller {
    /// Create a roller for faces in `[config.min, config.max]`.
    pub const fn new(config: DiceConfig) -> Self {
        Self {
            min: config.min,
            max: config.max,
            rolling: false,
        }
    }

    /// Roll both dice.
    ///
    /// Returns `None` while a previous roll has not settled.
    pub fn roll_initiative(&mut self, rng: &mut dyn RandomSource) -> Option<DiceRollResult> {
        if self.rolling {
            debug!("Initiative roll ignored, dice still rolling");
            return None;
        }
        self.rolling = true;
        let roll_a = rng.range_inclusive(self.min, self.max);
        let roll_b = rng.range_inclusive(self.min, self.max);
        Some(DiceRollResult::new(roll_a, roll_b))
    }

    /// A single die, independent of the busy flag.
    pub fn roll_single(&self, rng: &mut dyn RandomSource) -> i32 {
        rng.range_inclusive(self.min, self.max)
    }

    /// End the roll window so the next roll is accepted.
    pub const fn settle(&mut self) {
        self.rolling = false;
    }

    /// Whether a roll is in progress.
    pub const fn is_rolling(&self) -> bool {
        self.rolling
    }
}

impl Default for DiceRoller {
    fn default() -> Self {
        Self::new(DiceConfig::default())
    }
}
