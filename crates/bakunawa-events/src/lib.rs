//! Notification fan-out and effect history for the Bakunawa round engine.
//!
//! The engine pushes every [`MatchEvent`] through an [`EventBus`]. The bus
//! delivers to registered [`MatchListener`]s synchronously and to any
//! number of async subscribers over a `tokio` broadcast channel. Nothing
//! a listener does can block or fail the engine.
//!
//! # Modules
//!
//! - [`bus`] -- [`EventBus`], the [`MatchListener`] trait, and simple
//!   listeners ([`NoOpListener`], [`EventRecorder`]).
//! - [`history`] -- [`EffectHistoryLog`], a bounded newest-first log of
//!   applied Moon and Phenomenon effects.
//!
//! [`MatchEvent`]: bakunawa_types::MatchEvent

pub mod bus;
pub mod history;

pub use bus::{EventBus, EventRecorder, MatchListener, NoOpListener};
pub use history::{EffectHistoryEntry, EffectHistoryLog, EffectSource};
