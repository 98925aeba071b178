//! Shared type definitions for the Bakunawa round engine.
//!
//! This crate is the single source of truth for the data exchanged between
//! the engine and its collaborators. Types flow to `TypeScript` via `ts-rs`
//! for the presentation layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers
//! - [`enums`] -- Teams, phases, and effect classification
//! - [`structs`] -- Dice results, effect catalog entries, round records, snapshots
//! - [`events`] -- Notifications pushed by the engine

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EffectCategory, EffectType, MoonType, Phase, Team};
pub use events::MatchEvent;
pub use ids::MatchId;
pub use structs::{DiceRollResult, MatchSnapshot, MoonEffect, PhenomenonEffect, RoundRecord};
