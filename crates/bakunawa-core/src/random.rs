//! Uniform randomness behind a small trait.
//!
//! Every random draw in the engine (dice, effect picks, the stub round
//! resolver) goes through [`RandomSource`]. Any `rand::Rng` is a source;
//! tests can script exact outcomes with [`SequenceSource`].

use rand::Rng;

/// A uniform integer generator.
pub trait RandomSource {
    /// Uniform integer in `[low, high]`. Returns `low` when `low >= high`.
    fn range_inclusive(&mut self, low: i32, high: i32) -> i32;

    /// Uniform index in `[0, len)`, or `None` when `len` is zero.
    fn pick_index(&mut self, len: usize) -> Option<usize>;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        self.random_range(low..=high)
    }

    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.random_range(0..len))
    }
}

/// A scripted source replaying a fixed list of values, cycling at the end.
///
/// Range draws clamp the scripted value into the requested range. Index
/// draws reduce it modulo the length. An empty script always yields the
/// lowest value.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    values: Vec<i32>,
    cursor: usize,
}

impl SequenceSource {
    /// Create a source replaying `values` in order.
    pub fn new(values: impl Into<Vec<i32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Number of values consumed so far.
    pub const fn consumed(&self) -> usize {
        self.cursor
    }

    fn next_value(&mut self) -> Option<i32> {
        let len = self.values.len();
        if len == 0 {
            return None;
        }
        let value = self
            .cursor
            .checked_rem(len)
            .and_then(|i| self.values.get(i))
            .copied();
        self.cursor = self.cursor.saturating_add(1);
        value
    }
}

impl RandomSource for SequenceSource {
    fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            let _ = self.next_value();
            return low;
        }
        self.next_value().map_or(low, |v| v.clamp(low, high))
    }

    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let value = self.next_value().unwrap_or(0);
        let index = usize::try_from(value.unsigned_abs()).unwrap_or(0);
        index.checked_rem(len)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn rng_draws_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = rng.range_inclusive(1, 6);
            assert!((1..=6).contains(&v));
        }
        assert_eq!(rng.range_inclusive(4, 4), 4);
    }

    #[test]
    fn pick_index_on_empty_is_none() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(rng.pick_index(0), None);
        assert_eq!(SequenceSource::new([3]).pick_index(0), None);
    }

    #[test]
    fn sequence_replays_and_cycles() {
        let mut seq = SequenceSource::new([2, 5]);
        assert_eq!(seq.range_inclusive(1, 6), 2);
        assert_eq!(seq.range_inclusive(1, 6), 5);
        assert_eq!(seq.range_inclusive(1, 6), 2);
        assert_eq!(seq.consumed(), 3);
    }

    #[test]
    fn sequence_clamps_and_wraps() {
        let mut seq = SequenceSource::new([9, 7]);
        assert_eq!(seq.range_inclusive(1, 6), 6);
        assert_eq!(seq.pick_index(3), Some(1));
    }

    #[test]
    fn empty_sequence_yields_low() {
        let mut seq = SequenceSource::default();
        assert_eq!(seq.range_inclusive(-2, 3), -2);
        assert_eq!(seq.pick_index(4), Some(0));
    }
}
