//! Bounded log of applied Moon's Judgment and Celestial Phenomenon effects.
//!
//! The log listens on the event bus and keeps the most recent entries
//! first. Once [`EffectHistoryLog::capacity`] entries are held, the oldest
//! entry is dropped for each new one.

use bakunawa_types::MatchEvent;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bus::MatchListener;

/// Default number of entries kept by the log.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Which event system produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EffectSource {
    /// A one-shot Moon's Judgment effect.
    MoonJudgment,
    /// A multi-round Celestial Phenomenon.
    CelestialPhenomenon,
}

/// One applied effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectHistoryEntry {
    /// Effect name.
    pub name: String,
    /// Producing event system.
    pub source: EffectSource,
    /// Effect rules text.
    pub description: String,
    /// Round the effect was applied in.
    pub round: u32,
    /// Wall-clock time the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Newest-first log of applied effects.
#[derive(Debug, Clone)]
pub struct EffectHistoryLog {
    entries: Vec<EffectHistoryEntry>,
    capacity: usize,
}

impl EffectHistoryLog {
    /// Create a log holding at most [`DEFAULT_HISTORY_CAPACITY`] entries.
    pub const fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a log holding at most `capacity` entries (minimum 1).
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: if capacity == 0 { 1 } else { capacity },
        }
    }

    /// Maximum number of retained entries.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[EffectHistoryEntry] {
        &self.entries
    }

    /// Most recent entry.
    pub fn latest(&self) -> Option<&EffectHistoryEntry> {
        self.entries.first()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn push(&mut self, entry: EffectHistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
    }
}

impl Default for EffectHistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchListener for EffectHistoryLog {
    fn on_event(&mut self, event: &MatchEvent) {
        let (name, source, description, round) = match event {
            MatchEvent::MoonEffectApplied { round, effect } => (
                &effect.name,
                EffectSource::MoonJudgment,
                &effect.description,
                *round,
            ),
            MatchEvent::PhenomenonApplied { round, effect } => (
                &effect.name,
                EffectSource::CelestialPhenomenon,
                &effect.description,
                *round,
            ),
            MatchEvent::MatchReset { .. } => {
                self.clear();
                return;
            }
            _ => return,
        };
        self.push(EffectHistoryEntry {
            name: name.clone(),
            source,
            description: description.clone(),
            round,
            recorded_at: Utc::now(),
        });
    }
}
