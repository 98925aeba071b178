//! Operator control state for a running match.
//!
//! [`MatchControl`] is shared (in an [`Arc`]) between the task running
//! [`run_match`] and whoever drives it: a debug panel, a Ctrl-C handler, a
//! test. Requests are plain atomic flags. A single [`Notify`] wakes the
//! runner out of phase windows and pauses, and the runner consumes the
//! flags at its next suspension point.
//!
//! [`Arc`]: std::sync::Arc
//! [`run_match`]: crate::runner::run_match

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

/// Reason why a match run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEndReason {
    /// The match reached GameEnd with a winner.
    GameOver,
    /// An operator issued a stop command.
    OperatorStop,
}

/// A request that cuts the current wait short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Stop the run.
    Stop,
    /// Reset the engine and start over.
    Reset,
    /// Leave the current phase now.
    ForceNextPhase,
}

/// Shared match control state.
#[derive(Debug)]
pub struct MatchControl {
    /// Whether the countdown is paused.
    paused: AtomicBool,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Whether a reset has been requested.
    reset_requested: AtomicBool,

    /// Whether a forced phase advance has been requested.
    force_requested: AtomicBool,

    /// Wakes the runner on resume and on every request.
    wake: Notify,

    /// Wall-clock time when the control was created.
    started_at: DateTime<Utc>,

    /// Reason the run ended, if it has.
    end_reason: Mutex<Option<MatchEndReason>>,
}

impl MatchControl {
    /// Fresh control state: running, no requests pending.
    pub fn new() -> Self {
        Self {
            paused: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            reset_requested: AtomicBool::new(false),
            force_requested: AtomicBool::new(false),
            wake: Notify::new(),
            started_at: Utc::now(),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the countdown is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause at the next time-unit boundary.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume and wake the runner.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.wake.notify_one();
    }

    /// Wait until resumed, or until any request arrives.
    ///
    /// Returns immediately if not paused. A forced advance while paused is
    /// honored, so an operator can step through phases one at a time.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.has_pending_request() {
            self.wake.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    /// Leave the current phase as if its window had elapsed.
    pub fn force_next_phase(&self) {
        self.force_requested.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Reset the engine and start a fresh match.
    pub fn request_reset(&self) {
        self.reset_requested.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Request a clean stop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    fn has_pending_request(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
            || self.reset_requested.load(Ordering::Acquire)
            || self.force_requested.load(Ordering::Acquire)
    }

    /// Resolve once any request is pending. Does not consume it.
    pub async fn requested(&self) {
        while !self.has_pending_request() {
            self.wake.notified().await;
        }
    }

    /// Consume the highest-priority pending request.
    ///
    /// Stop outranks reset, which outranks a forced advance. A stop is
    /// never consumed. A reset also clears any pending forced advance.
    pub fn take_request(&self) -> Option<Interrupt> {
        if self.is_stop_requested() {
            return Some(Interrupt::Stop);
        }
        if self.reset_requested.swap(false, Ordering::AcqRel) {
            self.force_requested.store(false, Ordering::Release);
            return Some(Interrupt::Reset);
        }
        if self.force_requested.swap(false, Ordering::AcqRel) {
            return Some(Interrupt::ForceNextPhase);
        }
        None
    }

    // -----------------------------------------------------------------------
    // Bookkeeping
    // -----------------------------------------------------------------------

    /// Record the reason the run ended.
    pub async fn set_end_reason(&self, reason: MatchEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the run ended, if it has.
    pub async fn end_reason(&self) -> Option<MatchEndReason> {
        *self.end_reason.lock().await
    }

    /// Return the wall-clock creation time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since creation.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }
}

impl Default for MatchControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn initial_state_is_running() {
        let control = MatchControl::new();
        assert!(!control.is_paused());
        assert!(!control.is_stop_requested());
        assert_eq!(control.take_request(), None);
    }

    #[test]
    fn pause_and_resume() {
        let control = MatchControl::new();
        control.pause();
        assert!(control.is_paused());
        control.resume();
        assert!(!control.is_paused());
    }

    #[test]
    fn requests_are_prioritized() {
        let control = MatchControl::new();
        control.force_next_phase();
        control.request_reset();
        assert_eq!(control.take_request(), Some(Interrupt::Reset));
        assert_eq!(control.take_request(), None);

        control.force_next_phase();
        assert_eq!(control.take_request(), Some(Interrupt::ForceNextPhase));
        assert_eq!(control.take_request(), None);
    }

    #[test]
    fn stop_is_sticky() {
        let control = MatchControl::new();
        control.request_stop();
        control.force_next_phase();
        assert_eq!(control.take_request(), Some(Interrupt::Stop));
        assert_eq!(control.take_request(), Some(Interrupt::Stop));
    }

    #[tokio::test]
    async fn request_wakes_waiter() {
        let control = Arc::new(MatchControl::new());
        let waiter = {
            let control = Arc::clone(&control);
            tokio::spawn(async move { control.requested().await })
        };
        tokio::task::yield_now().await;
        control.force_next_phase();
        let joined = tokio::time::timeout(Duration::from_secs(1), waiter).await;
        assert!(joined.is_ok_and(|result| result.is_ok()));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_blocks_until_resume() {
        let control = Arc::new(MatchControl::new());
        control.pause();
        let waiter = {
            let control = Arc::clone(&control);
            tokio::spawn(async move { control.wait_if_paused().await })
        };
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!waiter.is_finished());

        control.resume();
        assert!(waiter.await.is_ok());
    }

    #[tokio::test]
    async fn end_reason_is_recorded() {
        let control = MatchControl::new();
        assert_eq!(control.end_reason().await, None);
        control.set_end_reason(MatchEndReason::GameOver).await;
        assert_eq!(control.end_reason().await, Some(MatchEndReason::GameOver));
    }
}
