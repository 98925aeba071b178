//! Listener that writes engine notifications to the tracing log.
//!
//! Milestones (round winners, effects, the match result) go to `info`,
//! phase and countdown detail to `debug`.

use bakunawa_events::MatchListener;
use bakunawa_types::MatchEvent;
use tracing::{debug, info};

/// Logs every [`MatchEvent`] with structured fields.
#[derive(Debug, Default)]
pub struct MatchLogListener {
    events_seen: u64,
}

impl MatchLogListener {
    /// Create a new log listener.
    pub const fn new() -> Self {
        Self { events_seen: 0 }
    }
}

impl MatchListener for MatchLogListener {
    fn on_event(&mut self, event: &MatchEvent) {
        self.events_seen = self.events_seen.saturating_add(1);
        let kind = event.label();
        match event {
            MatchEvent::MatchStarted { match_id } | MatchEvent::MatchReset { match_id } => {
                info!(kind, match_id = %match_id, "Match lifecycle");
            }
            MatchEvent::PhaseChanged { round, phase } => {
                debug!(kind, round, phase = %phase, "Phase entered");
            }
            MatchEvent::TimerTick { phase, remaining } => {
                debug!(kind, phase = %phase, remaining, "Countdown");
            }
            MatchEvent::RoundChanged { round } => {
                info!(kind, round, "Round started");
            }
            MatchEvent::DiceRolled { round, result } => {
                info!(
                    kind,
                    round,
                    roll_a = result.roll_a(),
                    roll_b = result.roll_b(),
                    first = %result.winner(),
                    tie = result.is_tie(),
                    "Initiative rolled"
                );
            }
            MatchEvent::RoundWinner { round, team } => {
                info!(kind, round, team = %team, "Round won");
            }
            MatchEvent::RoundDrawn { round } => {
                info!(kind, round, "Round drawn");
            }
            MatchEvent::FavorChanged { favor } => {
                info!(kind, favor, "Favor changed");
            }
            MatchEvent::GameWinner { team, final_favor } => {
                info!(
                    kind,
                    team = %team,
                    final_favor,
                    events = self.events_seen,
                    "Match won"
                );
            }
            MatchEvent::MoonEffectApplied { round, effect } => {
                info!(kind, round, effect = %effect.name, "Moon's Judgment");
            }
            MatchEvent::PhenomenonApplied { round, effect } => {
                info!(
                    kind,
                    round,
                    effect = %effect.name,
                    duration = effect.duration,
                    "Celestial Phenomenon"
                );
            }
            MatchEvent::PhenomenonCountdown { remaining } => {
                debug!(kind, remaining, "Phenomenon countdown");
            }
            MatchEvent::PhenomenonEnded { name } => {
                info!(kind, effect = %name, "Phenomenon ended");
            }
        }
    }
}
