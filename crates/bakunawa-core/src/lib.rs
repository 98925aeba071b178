//! Round engine, event systems, and match orchestration for Bakunawa.
//!
//! This crate owns the per-round phase state machine (RoundStart, DiceRoll,
//! EventCheck, StrategyPhase, CardClashing, RoundResolution) and the two
//! favor-driven event systems it invokes.
//!
//! # Modules
//!
//! - [`random`] -- [`RandomSource`] trait over `rand`, plus a scripted source.
//! - [`config`] -- Configuration loading from `bakunawa-config.yaml` into
//!   strongly-typed structs.
//! - [`dice`] -- Paired initiative roller with a busy guard.
//! - [`catalog`] -- Moon and phenomenon pools, loaders, built-in defaults,
//!   and selection.
//! - [`favor`] -- The clamped favor meter.
//! - [`moon`] -- Moon's Judgment.
//! - [`phenomena`] -- Celestial Phenomena.
//! - [`resolver`] -- [`RoundResolver`] trait and [`CoinFlipResolver`].
//! - [`engine`] -- [`RoundEngine`], the phase state machine.
//! - [`snapshot`] -- JSON encoding of match snapshots.
//! - [`control`] -- Shared operator controls for a running match.
//! - [`runner`] -- [`run_match`], the async loop that waits out phase windows.
//!
//! [`RandomSource`]: random::RandomSource
//! [`RoundResolver`]: resolver::RoundResolver
//! [`CoinFlipResolver`]: resolver::CoinFlipResolver
//! [`RoundEngine`]: engine::RoundEngine
//! [`run_match`]: runner::run_match

pub mod catalog;
pub mod config;
pub mod control;
pub mod dice;
pub mod engine;
pub mod favor;
pub mod moon;
pub mod phenomena;
pub mod random;
pub mod resolver;
pub mod runner;
pub mod snapshot;
