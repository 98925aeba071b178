//! Round engine: the per-round phase state machine.
//!
//! Each round runs the same six phases:
//!
//! 1. **RoundStart** -- announce the round number.
//! 2. **DiceRoll** -- roll initiative and store the result.
//! 3. **EventCheck** -- Moon's Judgment on configured rounds, a Celestial
//!    Phenomenon when favor sits on a configured threshold. Both may fire.
//! 4. **StrategyPhase** -- timed card-selection window with countdown ticks.
//! 5. **CardClashing** -- timed clash window.
//! 6. **RoundResolution** -- ask the [`RoundResolver`] for the winner, move
//!    favor one step toward them, append a [`RoundRecord`].
//!
//! After resolution the engine either ends the match or loops back to
//! RoundStart of the next round. Phase actions run on entry and report how
//! long the phase window lasts; waiting out that window is the runner's job.
//!
//! Every transition bumps a phase token. [`RoundEngine::advance_from`]
//! only acts on the current token, so a forced advance racing a natural
//! one advances exactly once.

use bakunawa_events::{EventBus, MatchListener};
use bakunawa_types::{
    DiceRollResult, MatchEvent, MatchId, MatchSnapshot, MoonEffect, Phase, PhenomenonEffect,
    RoundRecord, Team,
};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::catalog::EffectCatalog;
use crate::config::{ConfigError, EngineConfig, TiebreakPolicy};
use crate::dice::DiceRoller;
use crate::favor::FavorTrack;
use crate::moon::MoonsJudgment;
use crate::phenomena::CelestialPhenomena;
use crate::random::RandomSource;
use crate::resolver::{CoinFlipResolver, RoundContext, RoundResolver};
use crate::snapshot::SnapshotError;

/// The phase just entered and how long it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWindow {
    /// Token identifying this phase instance.
    pub token: u64,
    /// Phase entered.
    pub phase: Phase,
    /// Window length in time units, excluding the transition delay.
    pub units: u32,
}

impl PhaseWindow {
    /// Whether this window emits per-unit timer ticks.
    pub const fn is_countdown(&self) -> bool {
        self.phase.is_countdown()
    }

    /// Whether the match is over.
    pub const fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::GameEnd)
    }
}

/// The round engine. Owns all match state.
pub struct RoundEngine {
    config: EngineConfig,
    catalog: EffectCatalog,
    rng: Box<dyn RandomSource + Send>,
    resolver: Box<dyn RoundResolver>,
    bus: EventBus,
    dice: DiceRoller,
    favor: FavorTrack,
    moon: MoonsJudgment,
    phenomena: CelestialPhenomena,
    match_id: MatchId,
    current_round: u32,
    phase: Phase,
    is_active: bool,
    history: Vec<RoundRecord>,
    token: u64,
    winner: Option<Team>,
    round_dice: Option<DiceRollResult>,
    round_moon: Option<String>,
    round_phenomenon: bool,
}

impl RoundEngine {
    /// Build an engine in its initial state: round 1, favor 0, RoundStart,
    /// inactive.
    ///
    /// The random source is seeded from `config.random.seed`, or from OS
    /// entropy when unset. Rounds are resolved by [`CoinFlipResolver`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration fails validation,
    /// or [`ConfigError::Catalog`] if the catalog does.
    pub fn new(config: EngineConfig, catalog: EffectCatalog) -> Result<Self, ConfigError> {
        config.validate()?;
        catalog.validate()?;
        let rng: Box<dyn RandomSource + Send> = match config.random.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_os_rng()),
        };
        Ok(Self {
            dice: DiceRoller::new(config.dice),
            favor: FavorTrack::new(&config.favor),
            config,
            catalog,
            rng,
            resolver: Box::new(CoinFlipResolver::new()),
            bus: EventBus::new(),
            moon: MoonsJudgment::new(),
            phenomena: CelestialPhenomena::new(),
            match_id: MatchId::new(),
            current_round: 1,
            phase: Phase::RoundStart,
            is_active: false,
            history: Vec::new(),
            token: 0,
            winner: None,
            round_dice: None,
            round_moon: None,
            round_phenomenon: false,
        })
    }

    /// Replace the random source.
    #[must_use]
    pub fn with_rng(mut self, rng: impl RandomSource + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Replace the round resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl RoundResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    /// Register a synchronous listener on the engine's event bus.
    pub fn add_listener(&mut self, listener: impl MatchListener + 'static) {
        self.bus.add_listener(Box::new(listener));
    }

    /// Subscribe to engine events over a broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.bus.subscribe()
    }

    // -----------------------------------------------------------------------
    // State access
    // -----------------------------------------------------------------------

    /// Engine configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Effect catalog.
    pub const fn catalog(&self) -> &EffectCatalog {
        &self.catalog
    }

    /// Identifier of the current match.
    pub const fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// Current round number, starting at 1.
    pub const fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Current favor value.
    pub const fn favor(&self) -> i32 {
        self.favor.value()
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a match is running.
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Resolved rounds, oldest first.
    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    /// Match winner once the match has ended.
    pub const fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// Token of the current phase instance.
    pub const fn phase_token(&self) -> u64 {
        self.token
    }

    /// This round's initiative roll.
    pub const fn dice_result(&self) -> Option<DiceRollResult> {
        self.round_dice
    }

    /// Active Celestial Phenomenon.
    pub const fn active_phenomenon(&self) -> Option<&PhenomenonEffect> {
        self.phenomena.active()
    }

    /// Rounds left on the active phenomenon.
    pub const fn phenomenon_remaining(&self) -> u32 {
        self.phenomena.remaining_duration()
    }

    /// Moon's Judgment state.
    pub const fn moons_judgment(&self) -> &MoonsJudgment {
        &self.moon
    }

    /// The initiative dice.
    pub const fn dice(&self) -> &DiceRoller {
        &self.dice
    }

    // -----------------------------------------------------------------------
    // Phase machine
    // -----------------------------------------------------------------------

    /// Start (or continue) the match from RoundStart of the current round.
    ///
    /// A finished match is reset first.
    pub fn start(&mut self) -> PhaseWindow {
        if self.phase == Phase::GameEnd {
            self.reset_state();
        }
        self.is_active = true;
        info!(
            match_id = %self.match_id,
            round = self.current_round,
            favor = self.favor.value(),
            "Match started"
        );
        self.bus.publish(&MatchEvent::MatchStarted {
            match_id: self.match_id,
        });
        self.bus.publish(&MatchEvent::RoundChanged {
            round: self.current_round,
        });
        self.bus.publish(&MatchEvent::FavorChanged {
            favor: self.favor.value(),
        });
        self.enter(Phase::RoundStart)
    }

    /// Leave the phase identified by `token`.
    ///
    /// Returns `None` if the token is stale or no match is running.
    pub fn advance_from(&mut self, token: u64) -> Option<PhaseWindow> {
        if !self.is_active {
            debug!(token, "Advance ignored, no active match");
            return None;
        }
        if token != self.token {
            warn!(
                token,
                current = self.token,
                phase = %self.phase,
                "Stale phase token, advance ignored"
            );
            return None;
        }
        if self.phase == Phase::DiceRoll {
            self.dice.settle();
        }
        let window = match self.phase.next_in_round() {
            Some(next) => self.enter(next),
            None => self.finish_round(),
        };
        Some(window)
    }

    /// Leave the current phase as if its window had elapsed.
    pub fn force_next_phase(&mut self) -> Option<PhaseWindow> {
        debug!(phase = %self.phase, "Forcing next phase");
        self.advance_from(self.token)
    }

    /// Publish a countdown tick for the phase identified by `token`.
    ///
    /// Returns `false` (and publishes nothing) for a stale token or a phase
    /// without a countdown.
    pub fn timer_tick(&mut self, token: u64, remaining: u32) -> bool {
        if !self.is_active || token != self.token || !self.phase.is_countdown() {
            return false;
        }
        self.bus.publish(&MatchEvent::TimerTick {
            phase: self.phase,
            remaining,
        });
        true
    }

    /// Return to the initial state: round 1, favor 0, RoundStart, no
    /// history, no active phenomenon, inactive.
    pub fn reset(&mut self) {
        self.reset_state();
        info!(match_id = %self.match_id, "Match reset");
        self.bus.publish(&MatchEvent::MatchReset {
            match_id: self.match_id,
        });
        self.bus.publish(&MatchEvent::RoundChanged {
            round: self.current_round,
        });
        self.bus.publish(&MatchEvent::FavorChanged {
            favor: self.favor.value(),
        });
    }

    fn reset_state(&mut self) {
        self.current_round = 1;
        self.favor.reset();
        self.phase = Phase::RoundStart;
        self.is_active = false;
        self.history.clear();
        self.phenomena.clear();
        self.moon.reset();
        self.dice.settle();
        self.winner = None;
        self.clear_round_state();
        self.token = self.token.wrapping_add(1);
    }

    fn clear_round_state(&mut self) {
        self.round_dice = None;
        self.round_moon = None;
        self.round_phenomenon = false;
    }

    fn enter(&mut self, phase: Phase) -> PhaseWindow {
        self.phase = phase;
        self.token = self.token.wrapping_add(1);
        debug!(round = self.current_round, phase = %phase, token = self.token, "Phase entered");
        self.bus.publish(&MatchEvent::PhaseChanged {
            round: self.current_round,
            phase,
        });

        let units = match phase {
            Phase::RoundStart => {
                self.clear_round_state();
                info!(round = self.current_round, "Round start");
                self.config.timing.round_start_duration
            }
            Phase::DiceRoll => {
                self.roll_dice();
                self.config.timing.dice_roll_duration
            }
            Phase::EventCheck => self.check_events(),
            Phase::StrategyPhase => self.config.timing.strategy_phase_duration,
            Phase::CardClashing => self.config.timing.card_clashing_duration,
            Phase::RoundResolution => {
                self.resolve_round();
                self.config.timing.resolution_duration
            }
            Phase::GameEnd => 0,
        };
        PhaseWindow {
            token: self.token,
            phase,
            units,
        }
    }

    fn roll_dice(&mut self) {
        match self.dice.roll_initiative(&mut *self.rng) {
            Some(result) => {
                info!(
                    round = self.current_round,
                    roll_a = result.roll_a(),
                    roll_b = result.roll_b(),
                    tie = result.is_tie(),
                    "Initiative rolled"
                );
                self.round_dice = Some(result);
                self.bus.publish(&MatchEvent::DiceRolled {
                    round: self.current_round,
                    result,
                });
            }
            None => warn!(round = self.current_round, "Dice still rolling, no initiative"),
        }
    }

    /// Run both event checks. Returns the reveal window length.
    fn check_events(&mut self) -> u32 {
        let round = self.current_round;
        let mut fired: u32 = 0;

        if self.config.rounds.is_moon_round(round) {
            fired = fired.saturating_add(1);
            let _ = self.trigger_moons_judgment();
        }
        if self.config.favor.is_phenomenon_trigger(self.favor.value()) {
            fired = fired.saturating_add(1);
            let _ = self.trigger_phenomenon();
        }

        if fired == 0 {
            debug!(round, "No events this round");
            self.config.timing.no_event_duration
        } else {
            self.config.timing.event_reveal_duration.saturating_mul(fired)
        }
    }

    fn resolve_round(&mut self) {
        let round = self.current_round;
        let context = RoundContext {
            round,
            favor: self.favor.value(),
            dice: self.round_dice,
        };
        let winner = self.resolver.resolve_round(&context, &mut *self.rng);

        match winner {
            Some(team) => {
                self.bus.publish(&MatchEvent::RoundWinner { round, team });
                let _ = self.favor.adjust_and_notify(team.favor_step(), &mut self.bus);
            }
            None => {
                self.bus.publish(&MatchEvent::RoundDrawn { round });
            }
        }

        self.history.push(RoundRecord {
            round_number: round,
            dice_result: self.round_dice,
            round_winner: winner,
            moon_judgment_triggered: self.round_moon.is_some(),
            phenomenon_triggered: self.round_phenomenon,
            active_moon_effect_name: self.round_moon.clone(),
            active_phenomenon_name: self.phenomena.active().map(|p| p.name.clone()),
        });
        self.moon.record_round(winner);

        info!(
            round,
            winner = ?winner,
            favor = self.favor.value(),
            "Round resolved"
        );
    }

    fn finish_round(&mut self) -> PhaseWindow {
        if let Some(team) = self.match_winner() {
            return self.end_match(team);
        }
        if self.current_round >= self.config.rounds.max_rounds {
            info!(
                round = self.current_round,
                favor = self.favor.value(),
                "Favor tied after regulation, playing extra round"
            );
        }
        self.current_round = self.current_round.saturating_add(1);
        self.phenomena.on_round_advance(&mut self.bus);
        self.bus.publish(&MatchEvent::RoundChanged {
            round: self.current_round,
        });
        self.enter(Phase::RoundStart)
    }

    /// The match winner if the match ends after the current round.
    fn match_winner(&self) -> Option<Team> {
        let round = self.current_round;
        let max_rounds = self.config.rounds.max_rounds;
        if round < max_rounds {
            return None;
        }
        let holder = self.favor.holder();
        let decided = match self.config.rounds.tiebreak {
            TiebreakPolicy::SuddenDeath { .. } if round > max_rounds => self
                .history
                .last()
                .and_then(|r| r.round_winner)
                .or(holder),
            TiebreakPolicy::ExtraRounds { .. } | TiebreakPolicy::SuddenDeath { .. } => holder,
        };
        decided.or_else(|| {
            let tiebreak = self.config.rounds.tiebreak;
            (round >= tiebreak.round_cap()).then(|| {
                let cap_winner = tiebreak.cap_winner();
                info!(round, winner = %cap_winner, "Round cap reached without a decision");
                cap_winner
            })
        })
    }

    fn end_match(&mut self, team: Team) -> PhaseWindow {
        self.winner = Some(team);
        let window = self.enter(Phase::GameEnd);
        self.is_active = false;
        let final_favor = self.favor.value();
        info!(
            match_id = %self.match_id,
            winner = %team,
            final_favor,
            rounds = self.current_round,
            "Match over"
        );
        self.bus.publish(&MatchEvent::GameWinner { team, final_favor });
        window
    }

    // -----------------------------------------------------------------------
    // Manual controls
    // -----------------------------------------------------------------------

    /// Shift favor by `delta`, clamped. Returns the new value if it changed.
    pub fn adjust_favor(&mut self, delta: i32) -> Option<i32> {
        self.favor.adjust_and_notify(delta, &mut self.bus)
    }

    /// Draw and apply a Moon's Judgment effect now.
    pub fn trigger_moons_judgment(&mut self) -> Option<MoonEffect> {
        let effect = self.moon.trigger(
            &self.catalog,
            &mut *self.rng,
            &mut self.favor,
            self.current_round,
            &mut self.bus,
        )?;
        self.round_moon = Some(effect.name.clone());
        Some(effect)
    }

    /// Draw and activate a Celestial Phenomenon for the current favor now.
    pub fn trigger_phenomenon(&mut self) -> Option<PhenomenonEffect> {
        let effect = self.phenomena.trigger(
            &self.catalog,
            self.favor.value(),
            &mut *self.rng,
            self.current_round,
            &mut self.bus,
        )?;
        self.round_phenomenon = true;
        Some(effect)
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Capture the persistable match state.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            match_id: self.match_id,
            current_round: self.current_round,
            favor: self.favor.value(),
            active_phenomenon_name: self.phenomena.active().map(|p| p.name.clone()),
            phenomenon_duration: self.phenomena.remaining_duration(),
            last_moon_effect_name: self.moon.current_effect().map(|e| e.name.clone()),
            history: self.history.clone(),
            saved_at: Utc::now(),
        }
    }

    /// Load a snapshot. The engine is left inactive; call
    /// [`start`](Self::start) to continue.
    ///
    /// A snapshot whose current round is already resolved (taken during
    /// RoundResolution or after the match ended) resumes from the round
    /// that follows it, or lands on GameEnd when that round decided the
    /// match. Otherwise the engine waits at RoundStart of the snapshot's
    /// round.
    ///
    /// Favor is clamped to the configured range. Effect names unknown to
    /// the catalog are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Inconsistent`] when the round number and
    /// history disagree. The engine is unchanged in that case.
    pub fn restore(&mut self, snapshot: &MatchSnapshot) -> Result<(), SnapshotError> {
        crate::snapshot::check_consistency(snapshot)?;

        self.reset_state();
        self.match_id = snapshot.match_id;
        self.current_round = snapshot.current_round;
        self.favor.set(snapshot.favor);
        self.history.clone_from(&snapshot.history);
        if let Some(name) = &snapshot.active_phenomenon_name {
            self.phenomena
                .restore(&self.catalog, name, snapshot.phenomenon_duration);
        }
        if let Some(name) = &snapshot.last_moon_effect_name {
            self.moon.restore_current(&self.catalog, name);
        }
        self.moon
            .record_round(self.history.last().and_then(|r| r.round_winner));

        let round_resolved = self
            .history
            .last()
            .is_some_and(|r| r.round_number == self.current_round);
        if round_resolved {
            match self.match_winner() {
                Some(team) => {
                    self.winner = Some(team);
                    self.phase = Phase::GameEnd;
                }
                None => {
                    self.current_round = self.current_round.saturating_add(1);
                    self.phenomena.on_round_advance(&mut self.bus);
                }
            }
        }

        info!(
            match_id = %self.match_id,
            round = self.current_round,
            favor = self.favor.value(),
            winner = ?self.winner,
            "Match restored from snapshot"
        );
        self.bus.publish(&MatchEvent::RoundChanged {
            round: self.current_round,
        });
        self.bus.publish(&MatchEvent::FavorChanged {
            favor: self.favor.value(),
        });
        Ok(())
    }
}

impl core::fmt::Debug for RoundEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RoundEngine")
            .field("match_id", &self.match_id)
            .field("current_round", &self.current_round)
            .field("favor", &self.favor.value())
            .field("phase", &self.phase)
            .field("is_active", &self.is_active)
            .field("history", &self.history.len())
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bakunawa_events::EventRecorder;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::TimingConfig;
    use crate::resolver::ScriptedResolver;

    fn engine() -> RoundEngine {
        let mut config = EngineConfig::default();
        config.timing = TimingConfig::instant();
        RoundEngine::new(config, EffectCatalog::builtin())
            .unwrap()
            .with_rng(SmallRng::seed_from_u64(42))
    }

    /// Advance until the given phase is current, returning its window.
    fn advance_to(engine: &mut RoundEngine, phase: Phase) -> PhaseWindow {
        loop {
            let window = engine.force_next_phase().unwrap();
            if window.phase == phase {
                return window;
            }
        }
    }

    #[test]
    fn initial_state() {
        let engine = engine();
        assert_eq!(engine.current_round(), 1);
        assert_eq!(engine.favor(), 0);
        assert_eq!(engine.phase(), Phase::RoundStart);
        assert!(!engine.is_active());
        assert!(engine.history().is_empty());
    }

    #[test]
    fn phases_run_in_order() {
        let mut engine = engine();
        let first = engine.start();
        assert_eq!(first.phase, Phase::RoundStart);

        let mut seen = vec![first.phase];
        for _ in 0..6 {
            seen.push(engine.force_next_phase().unwrap().phase);
        }
        assert_eq!(
            seen,
            vec![
                Phase::RoundStart,
                Phase::DiceRoll,
                Phase::EventCheck,
                Phase::StrategyPhase,
                Phase::CardClashing,
                Phase::RoundResolution,
                Phase::RoundStart,
            ]
        );
        assert_eq!(engine.current_round(), 2);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn stale_token_does_not_double_advance() {
        let mut engine = engine();
        let start = engine.start();
        let dice = engine.advance_from(start.token).unwrap();
        assert_eq!(dice.phase, Phase::DiceRoll);

        assert!(engine.advance_from(start.token).is_none());
        assert_eq!(engine.phase(), Phase::DiceRoll);
    }

    #[test]
    fn racing_advances_append_history_once() {
        let mut engine = engine();
        let _ = engine.start();
        let resolution = advance_to(&mut engine, Phase::RoundResolution);
        assert_eq!(engine.history().len(), 1);

        let natural = engine.advance_from(resolution.token);
        let forced = engine.advance_from(resolution.token);
        assert!(natural.is_some());
        assert!(forced.is_none());
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.current_round(), 2);
    }

    #[test]
    fn dice_roll_is_stored_and_settled() {
        let mut engine = engine();
        let _ = engine.start();
        let _ = advance_to(&mut engine, Phase::DiceRoll);
        assert!(engine.dice().is_rolling());
        let result = engine.dice_result().unwrap();
        assert!((1..=6).contains(&result.roll_a()));

        let _ = engine.force_next_phase();
        assert!(!engine.dice().is_rolling());
    }

    #[test]
    fn round_winner_moves_favor_and_records_outcome() {
        let mut engine = engine().with_resolver(ScriptedResolver::new([Some(Team::Tribesmen)]));
        let _ = engine.start();
        let _ = advance_to(&mut engine, Phase::RoundResolution);

        assert_eq!(engine.favor(), -1);
        assert_eq!(engine.moons_judgment().last_round_winner(), -1);
        let record = engine.history().first().unwrap();
        assert_eq!(record.round_number, 1);
        assert_eq!(record.round_winner, Some(Team::Tribesmen));
        assert!(record.dice_result.is_some());
    }

    #[test]
    fn drawn_round_leaves_favor_alone() {
        let mut engine = engine().with_resolver(ScriptedResolver::new([None]));
        let recorder = Arc::new(Mutex::new(EventRecorder::new()));
        engine.add_listener(Arc::clone(&recorder));
        let _ = engine.start();
        let _ = advance_to(&mut engine, Phase::RoundResolution);

        assert_eq!(engine.favor(), 0);
        assert_eq!(engine.moons_judgment().last_round_winner(), 0);
        assert_eq!(
            recorder
                .lock()
                .unwrap()
                .count(|e| matches!(e, MatchEvent::RoundDrawn { round: 1 })),
            1
        );
    }

    #[test]
    fn timer_ticks_only_in_countdown_phases() {
        let mut engine = engine();
        let start = engine.start();
        assert!(!engine.timer_tick(start.token, 1));

        let strategy = advance_to(&mut engine, Phase::StrategyPhase);
        assert!(engine.timer_tick(strategy.token, 89));
        assert!(!engine.timer_tick(start.token, 88));
    }

    #[test]
    fn event_check_window_counts_fired_events() {
        let mut config = EngineConfig::default();
        config.timing = TimingConfig::instant();
        config.timing.event_reveal_duration = 3;
        config.timing.no_event_duration = 1;
        config.rounds.moon_judgment_rounds = vec![1];
        let mut engine = RoundEngine::new(config, EffectCatalog::builtin())
            .unwrap()
            .with_rng(SmallRng::seed_from_u64(1));
        let _ = engine.start();
        let _ = engine.adjust_favor(2);
        let window = advance_to(&mut engine, Phase::EventCheck);
        assert_eq!(window.units, 6);
        assert!(engine.active_phenomenon().is_some());
    }

    #[test]
    fn manual_controls() {
        let mut engine = engine();
        assert_eq!(engine.adjust_favor(3), Some(3));
        assert_eq!(engine.adjust_favor(10), Some(5));
        assert_eq!(engine.adjust_favor(1), None);

        let moon = engine.trigger_moons_judgment().unwrap();
        assert_eq!(engine.moons_judgment().current_effect().unwrap().name, moon.name);

        let _ = engine.adjust_favor(-1);
        let phenomenon = engine.trigger_phenomenon().unwrap();
        assert_eq!(phenomenon.trigger_threshold, 4);
        assert!(engine.active_phenomenon().unwrap().is_active);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.rounds.max_rounds = 0;
        assert!(RoundEngine::new(config, EffectCatalog::builtin()).is_err());
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut engine = engine();
        let _ = engine.start();
        for _ in 0..13 {
            let _ = engine.force_next_phase();
        }
        let _ = engine.adjust_favor(4_i32.saturating_sub(engine.favor()));
        let _ = engine.trigger_phenomenon();
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.current_round, 3);
        assert_eq!(snapshot.history.len(), 2);

        let mut other = RoundEngine::new(EngineConfig::default(), EffectCatalog::builtin()).unwrap();
        other.restore(&snapshot).unwrap();
        assert_eq!(other.match_id(), engine.match_id());
        assert_eq!(other.current_round(), 3);
        assert_eq!(other.favor(), 4);
        assert_eq!(other.history(), engine.history());
        assert_eq!(
            other.active_phenomenon().map(|p| p.name.clone()),
            snapshot.active_phenomenon_name
        );
        assert_eq!(other.phenomenon_remaining(), 2);
        assert!(!other.is_active());

        let window = other.start();
        assert_eq!(window.phase, Phase::RoundStart);
        assert_eq!(other.current_round(), 3);
    }

    #[test]
    fn restore_mid_resolution_resumes_next_round() {
        let mut engine = engine().with_resolver(ScriptedResolver::new([Some(Team::Bakunawa)]));
        let _ = engine.start();
        let _ = advance_to(&mut engine, Phase::RoundResolution);
        let json = crate::snapshot::to_json(&engine.snapshot()).unwrap();
        let snapshot = crate::snapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.current_round, 1);
        assert_eq!(snapshot.history.len(), 1);

        let mut other = self::engine();
        other.restore(&snapshot).unwrap();
        assert_eq!(other.current_round(), 2);
        assert_eq!(other.favor(), 1);
        assert_eq!(other.winner(), None);
        assert_eq!(other.moons_judgment().last_round_winner(), 1);

        let window = other.start();
        assert_eq!(window.phase, Phase::RoundStart);
        assert_eq!(other.current_round(), 2);
        assert_eq!(other.history().len(), 1);
    }

    #[test]
    fn restore_finished_match_lands_on_game_end() {
        let mut engine = engine();
        let mut window = engine.start();
        while !window.is_terminal() {
            window = engine.force_next_phase().unwrap();
        }
        let json = crate::snapshot::to_json(&engine.snapshot()).unwrap();
        let snapshot = crate::snapshot::from_json(&json).unwrap();

        let mut other = self::engine();
        other.restore(&snapshot).unwrap();
        assert_eq!(other.phase(), Phase::GameEnd);
        assert_eq!(other.winner(), engine.winner());
        assert_eq!(other.current_round(), engine.current_round());
        assert_eq!(other.history(), engine.history());
        assert!(!other.is_active());
        assert!(other.force_next_phase().is_none());
    }

    #[test]
    fn rejects_catalog_with_endless_phenomenon() {
        let mut phenomena = crate::catalog::default_phenomena();
        if let Some(first) = phenomena.first_mut() {
            first.duration = 0;
        }
        let catalog = EffectCatalog::new(
            crate::catalog::default_normal_effects(),
            crate::catalog::default_neutral_effects(),
            phenomena,
        );
        let result = RoundEngine::new(EngineConfig::default(), catalog);
        assert!(matches!(result, Err(ConfigError::Catalog { .. })));
    }

    #[test]
    fn restore_rejects_mismatched_history() {
        let mut engine = engine();
        let mut snapshot = engine.snapshot();
        snapshot.current_round = 4;
        assert!(matches!(
            engine.restore(&snapshot),
            Err(SnapshotError::Inconsistent { .. })
        ));
        assert_eq!(engine.current_round(), 1);
    }
}
