//! The favor meter.
//!
//! A signed, bounded integer. Positive values favor [`Team::Bakunawa`],
//! negative values [`Team::Tribesmen`]. Every change goes through
//! [`FavorTrack::adjust`], which clamps to the configured range.
//!
//! [`Team::Bakunawa`]: bakunawa_types::Team::Bakunawa
//! [`Team::Tribesmen`]: bakunawa_types::Team::Tribesmen

use bakunawa_events::EventBus;
use bakunawa_types::{MatchEvent, Team};
use tracing::debug;

use crate::config::FavorConfig;

/// Bounded favor meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavorTrack {
    value: i32,
    min: i32,
    max: i32,
}

impl FavorTrack {
    /// A meter at zero with the given bounds.
    pub const fn new(config: &FavorConfig) -> Self {
        Self {
            value: 0,
            min: config.min,
            max: config.max,
        }
    }

    /// Current value.
    pub const fn value(&self) -> i32 {
        self.value
    }

    /// Lower bound.
    pub const fn min(&self) -> i32 {
        self.min
    }

    /// Upper bound.
    pub const fn max(&self) -> i32 {
        self.max
    }

    /// Team currently holding favor, `None` at zero.
    pub const fn holder(&self) -> Option<Team> {
        Team::holding_favor(self.value)
    }

    /// Shift the meter by `delta`, clamped to the bounds.
    ///
    /// Returns the new value if it changed.
    pub fn adjust(&mut self, delta: i32) -> Option<i32> {
        let next = self.value.saturating_add(delta).clamp(self.min, self.max);
        if next == self.value {
            return None;
        }
        self.value = next;
        Some(next)
    }

    /// [`adjust`](Self::adjust) and publish `FavorChanged` when the value moved.
    pub fn adjust_and_notify(&mut self, delta: i32, bus: &mut EventBus) -> Option<i32> {
        let changed = self.adjust(delta)?;
        debug!(favor = changed, delta, "Favor changed");
        bus.publish(&MatchEvent::FavorChanged { favor: changed });
        Some(changed)
    }

    /// Overwrite the value, clamped to the bounds.
    pub fn set(&mut self, value: i32) {
        self.value = value.clamp(self.min, self.max);
    }

    /// Back to zero.
    pub const fn reset(&mut self) {
        self.value = 0;
    }
}

impl Default for FavorTrack {
    fn default() -> Self {
        Self::new(&FavorConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bakunawa_events::EventRecorder;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn eleven_steps_up_stop_at_five() {
        let mut favor = FavorTrack::default();
        for _ in 0..11 {
            let _ = favor.adjust(1);
        }
        assert_eq!(favor.value(), 5);
        assert_eq!(favor.holder(), Some(Team::Bakunawa));
    }

    #[test]
    fn adjust_reports_only_real_changes() {
        let mut favor = FavorTrack::default();
        assert_eq!(favor.adjust(-1), Some(-1));
        assert_eq!(favor.adjust(0), None);
        favor.set(-5);
        assert_eq!(favor.adjust(-1), None);
        assert_eq!(favor.holder(), Some(Team::Tribesmen));
    }

    #[test]
    fn notifies_only_on_change() {
        let recorder = Arc::new(Mutex::new(EventRecorder::new()));
        let mut bus = EventBus::new();
        bus.add_listener(Box::new(Arc::clone(&recorder)));

        let mut favor = FavorTrack::default();
        favor.set(5);
        assert_eq!(favor.adjust_and_notify(2, &mut bus), None);
        assert_eq!(favor.adjust_and_notify(-3, &mut bus), Some(2));

        let events = recorder.lock().unwrap();
        assert_eq!(events.events(), &[MatchEvent::FavorChanged { favor: 2 }]);
    }

    #[test]
    fn set_and_reset_respect_bounds() {
        let mut favor = FavorTrack::default();
        favor.set(40);
        assert_eq!(favor.value(), favor.max());
        favor.reset();
        assert_eq!(favor.value(), 0);
        assert_eq!(favor.holder(), None);
    }

    proptest! {
        #[test]
        fn clamp_never_violated(deltas in proptest::collection::vec(-7_i32..=7, 0..64)) {
            let mut favor = FavorTrack::default();
            for delta in deltas {
                let _ = favor.adjust(delta);
                prop_assert!((-5..=5).contains(&favor.value()));
            }
        }
    }
}
