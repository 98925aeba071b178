//! Event bus delivering engine notifications to listeners and subscribers.
//!
//! Listeners are invoked in registration order. Broadcast subscribers that
//! fall behind by more than [`BROADCAST_CAPACITY`] events receive a
//! `Lagged` error and skip ahead; the engine is never slowed down.

use std::sync::{Arc, Mutex};

use bakunawa_types::MatchEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Capacity of the broadcast channel for match events.
pub const BROADCAST_CAPACITY: usize = 256;

/// A synchronous consumer of match events.
///
/// Implementations should return quickly; they run inline with the engine.
pub trait MatchListener: Send {
    /// Called for every event the engine emits.
    fn on_event(&mut self, event: &MatchEvent);
}

/// A listener that ignores every event.
pub struct NoOpListener;

impl MatchListener for NoOpListener {
    fn on_event(&mut self, _event: &MatchEvent) {}
}

/// A listener that keeps every event it receives, in order.
#[derive(Debug, Default, Clone)]
pub struct EventRecorder {
    events: Vec<MatchEvent>,
}

impl EventRecorder {
    /// Create an empty recorder.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Events received so far.
    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    /// Number of received events matching the predicate.
    pub fn count(&self, predicate: impl Fn(&MatchEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }

    /// Drop all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl MatchListener for EventRecorder {
    fn on_event(&mut self, event: &MatchEvent) {
        self.events.push(event.clone());
    }
}

/// Shared listeners stay readable by their owner while the bus holds a clone.
impl<L: MatchListener> MatchListener for Arc<Mutex<L>> {
    fn on_event(&mut self, event: &MatchEvent) {
        if let Ok(mut guard) = self.lock() {
            guard.on_event(event);
        }
    }
}

/// Fan-out point for every notification the engine emits.
pub struct EventBus {
    listeners: Vec<Box<dyn MatchListener>>,
    tx: broadcast::Sender<MatchEvent>,
}

impl EventBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            listeners: Vec::new(),
            tx,
        }
    }

    /// Register a synchronous listener.
    pub fn add_listener(&mut self, listener: Box<dyn MatchListener>) {
        self.listeners.push(listener);
    }

    /// Number of registered synchronous listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Subscribe to the broadcast channel.
    ///
    /// The receiver yields every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.tx.subscribe()
    }

    /// Deliver an event to every listener and broadcast subscriber.
    ///
    /// Returns the number of broadcast receivers that got the event; zero
    /// subscribers is not an error.
    pub fn publish(&mut self, event: &MatchEvent) -> usize {
        for listener in &mut self.listeners {
            listener.on_event(event);
        }
        let receivers = self.tx.send(event.clone()).unwrap_or(0);
        trace!(event = event.label(), receivers, "Event published");
        receivers
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("subscribers", &self.tx.receiver_count())
            .finish()
    }
}
