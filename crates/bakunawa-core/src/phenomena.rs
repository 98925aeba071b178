//! Celestial Phenomena: multi-round effects keyed to the favor meter.
//!
//! At most one phenomenon is active. Triggering a new one replaces the
//! current one immediately and discards whatever duration it had left.
//! The active phenomenon counts down once per round advance.

use bakunawa_events::EventBus;
use bakunawa_types::{MatchEvent, PhenomenonEffect};
use tracing::{debug, info};

use crate::catalog::EffectCatalog;
use crate::random::RandomSource;

/// The active phenomenon and its countdown.
#[derive(Debug, Clone, Default)]
pub struct CelestialPhenomena {
    current: Option<PhenomenonEffect>,
    remaining: u32,
}

impl CelestialPhenomena {
    /// No active phenomenon.
    pub const fn new() -> Self {
        Self {
            current: None,
            remaining: 0,
        }
    }

    /// The active phenomenon.
    pub const fn active(&self) -> Option<&PhenomenonEffect> {
        self.current.as_ref()
    }

    /// Rounds left on the active phenomenon, zero when none is active.
    pub const fn remaining_duration(&self) -> u32 {
        self.remaining
    }

    /// Draw a phenomenon eligible at `favor` and activate it.
    ///
    /// Publishes `PhenomenonApplied`. Returns `None` without touching the
    /// active phenomenon when nothing is eligible.
    pub fn trigger(
        &mut self,
        catalog: &EffectCatalog,
        favor: i32,
        rng: &mut dyn RandomSource,
        round: u32,
        bus: &mut EventBus,
    ) -> Option<PhenomenonEffect> {
        let selected = catalog.select_phenomenon(favor, rng)?.clone();
        if let Some(previous) = self.current.take() {
            debug!(
                previous = %previous.name,
                discarded = self.remaining,
                "Active phenomenon replaced"
            );
        }
        let effect = self.activate(selected, None);
        info!(
            round,
            favor,
            effect = %effect.name,
            duration = self.remaining,
            "Celestial Phenomenon applied"
        );
        bus.publish(&MatchEvent::PhenomenonApplied {
            round,
            effect: effect.clone(),
        });
        Some(effect)
    }

    /// Count down one round.
    ///
    /// Publishes `PhenomenonCountdown` while rounds remain, and
    /// `PhenomenonEnded` when the countdown reaches zero.
    pub fn on_round_advance(&mut self, bus: &mut EventBus) {
        if self.current.is_none() || self.remaining == 0 {
            return;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            bus.publish(&MatchEvent::PhenomenonCountdown {
                remaining: self.remaining,
            });
            return;
        }
        if let Some(ended) = self.current.take() {
            info!(effect = %ended.name, "Celestial Phenomenon ended");
            bus.publish(&MatchEvent::PhenomenonEnded { name: ended.name });
        }
    }

    /// Deactivate without notification.
    pub fn clear(&mut self) {
        self.current = None;
        self.remaining = 0;
    }

    /// Reactivate a named catalog phenomenon with the given rounds left.
    ///
    /// Unknown names and a zero countdown leave nothing active.
    pub fn restore(&mut self, catalog: &EffectCatalog, name: &str, remaining: u32) {
        self.clear();
        if remaining == 0 {
            return;
        }
        match catalog.find_phenomenon(name) {
            Some(found) => {
                let _ = self.activate(found.clone(), Some(remaining));
            }
            None => debug!(name, "Snapshot phenomenon not in catalog"),
        }
    }

    fn activate(&mut self, mut effect: PhenomenonEffect, remaining: Option<u32>) -> PhenomenonEffect {
        effect.is_active = true;
        self.remaining = remaining.unwrap_or(effect.duration);
        self.current = Some(effect.clone());
        effect
    }
}
