//! Match loop runner with operator controls.
//!
//! This module provides [`run_match`], the top-level async function that
//! drives a [`RoundEngine`] through a whole match with support for:
//!
//! - **Timed phases**: each phase window and the transition delay after it
//!   are waited out one time unit at a time
//! - **Countdown ticks**: a `TimerTick` per unit of Strategy and
//!   CardClashing windows
//! - **Forced advance**: cut the current window short
//! - **Pause/resume**: hold at the next time-unit boundary
//! - **Reset**: return the engine to round 1 and start over
//! - **Operator stop**: clean stop between units
//!
//! The engine itself never sleeps; the runner owns every suspension point.

use std::sync::Arc;
use std::time::Duration;

use bakunawa_types::{Phase, RoundRecord, Team};
use tracing::{debug, info, warn};

use crate::control::{Interrupt, MatchControl, MatchEndReason};
use crate::engine::{PhaseWindow, RoundEngine};

/// Errors that can occur during a match run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The engine refused to leave the phase the runner was waiting on.
    #[error("engine refused to advance from {phase} (token {token})")]
    Desync {
        /// Phase the runner was waiting on.
        phase: Phase,
        /// Token of that phase.
        token: u64,
    },
}

/// Result of a match run.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The reason the run ended.
    pub end_reason: MatchEndReason,
    /// Match winner, `None` when stopped early.
    pub winner: Option<Team>,
    /// Favor when the run ended.
    pub final_favor: i32,
    /// Round in progress (or last played) when the run ended.
    pub final_round: u32,
    /// Resolved rounds, oldest first.
    pub history: Vec<RoundRecord>,
}

/// How a wait ended.
enum WaitOutcome {
    Elapsed,
    Interrupted(Interrupt),
}

/// Run a match until it ends or an operator stops it.
///
/// Starts the engine (continuing from its current round, so a restored
/// snapshot resumes where it left off) and waits out every phase window
/// using the configured time unit.
///
/// # Errors
///
/// Returns [`RunnerError::Desync`] if the engine rejects the runner's
/// phase token, which means something else advanced it.
pub async fn run_match(
    engine: &mut RoundEngine,
    control: &Arc<MatchControl>,
) -> Result<MatchResult, RunnerError> {
    let timing = &engine.config().timing;
    let unit = Duration::from_millis(timing.time_unit_ms);
    let transition_delay = timing.phase_transition_delay;

    info!(
        max_rounds = engine.config().rounds.max_rounds,
        time_unit_ms = timing.time_unit_ms,
        "Match run starting"
    );

    let mut window = engine.start();

    loop {
        if window.is_terminal() {
            return Ok(finish(engine, control, MatchEndReason::GameOver).await);
        }

        let mut outcome = wait_units(engine, control, &window, window.units, unit, true).await;
        if matches!(outcome, WaitOutcome::Elapsed) {
            outcome = wait_units(engine, control, &window, transition_delay, unit, false).await;
        }

        window = match outcome {
            WaitOutcome::Elapsed => advance(engine, &window)?,
            WaitOutcome::Interrupted(Interrupt::ForceNextPhase) => {
                debug!(phase = %window.phase, "Phase window cut short");
                advance(engine, &window)?
            }
            WaitOutcome::Interrupted(Interrupt::Reset) => {
                info!("Operator reset, starting a fresh match");
                engine.reset();
                engine.start()
            }
            WaitOutcome::Interrupted(Interrupt::Stop) => {
                info!(
                    round = engine.current_round(),
                    phase = %engine.phase(),
                    "Operator stop requested"
                );
                return Ok(finish(engine, control, MatchEndReason::OperatorStop).await);
            }
        };
    }
}

fn advance(engine: &mut RoundEngine, window: &PhaseWindow) -> Result<PhaseWindow, RunnerError> {
    engine
        .advance_from(window.token)
        .ok_or(RunnerError::Desync {
            phase: window.phase,
            token: window.token,
        })
}

/// Wait `units` time units, publishing countdown ticks when `ticks` is set
/// and the phase has a countdown. Returns early on any operator request.
async fn wait_units(
    engine: &mut RoundEngine,
    control: &MatchControl,
    window: &PhaseWindow,
    units: u32,
    unit: Duration,
    ticks: bool,
) -> WaitOutcome {
    let countdown = ticks && window.is_countdown();
    for elapsed in 1..=units {
        if control.is_paused() {
            info!(phase = %window.phase, "Match paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Match resumed");
        }
        if let Some(request) = control.take_request() {
            return WaitOutcome::Interrupted(request);
        }

        tokio::select! {
            () = tokio::time::sleep(unit) => {}
            () = control.requested() => {}
        }
        if let Some(request) = control.take_request() {
            return WaitOutcome::Interrupted(request);
        }

        if countdown {
            let _ = engine.timer_tick(window.token, units.saturating_sub(elapsed));
        }
    }
    control
        .take_request()
        .map_or(WaitOutcome::Elapsed, WaitOutcome::Interrupted)
}

async fn finish(
    engine: &mut RoundEngine,
    control: &MatchControl,
    end_reason: MatchEndReason,
) -> MatchResult {
    control.set_end_reason(end_reason).await;
    MatchResult {
        end_reason,
        winner: engine.winner(),
        final_favor: engine.favor(),
        final_round: engine.current_round(),
        history: engine.history().to_vec(),
    }
}

/// Log the end of a match run.
pub fn log_match_end(result: &MatchResult) {
    info!(
        reason = ?result.end_reason,
        winner = ?result.winner,
        final_favor = result.final_favor,
        final_round = result.final_round,
        rounds_resolved = result.history.len(),
        "Match run ended"
    );
    if result.winner.is_none() {
        warn!("Match run ended without a winner");
    }
}
