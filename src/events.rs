//! Engine event emission.
//!
//! Sessions can surface their progress (question presented, answer recorded,
//! decision taken, summary ready) to an observer over a `flume` channel.
//! Observation is ambient: an absent or disconnected observer never changes
//! engine behavior. Wire the receiver to a logger, an SSE stream, or a test
//! assertion as needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One progress event from a running session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineEvent {
    /// When the event was emitted.
    pub when: DateTime<Utc>,
    /// Session the event belongs to.
    pub session_id: String,
    /// Step number at emission time.
    pub step: u64,
    /// Short scope label, e.g. `"ask"`, `"record"`, `"decide"`, `"summary"`.
    pub scope: String,
    /// Human-readable description.
    pub message: String,
}

impl EngineEvent {
    pub fn new(
        session_id: impl Into<String>,
        step: u64,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            when: Utc::now(),
            session_id: session_id.into(),
            step,
            scope: scope.into(),
            message: message.into(),
        }
    }
}

/// Cloneable handle the engine emits through.
///
/// A disabled emitter (the default) drops events; a connected one sends them
/// to the paired receiver. Emission is best-effort: when the receiver is
/// gone the event is logged at debug level and dropped.
#[derive(Clone, Debug, Default)]
pub struct EventEmitter {
    sender: Option<flume::Sender<EngineEvent>>,
}

impl EventEmitter {
    /// An emitter that discards everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Emit one event. Never fails the caller.
    pub fn emit(&self, event: EngineEvent) {
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                debug!("event observer disconnected; dropping engine events");
            }
        }
    }
}

/// Build a connected emitter/receiver pair.
///
/// # Examples
///
/// ```
/// use colloquy::events::{self, EngineEvent};
///
/// let (emitter, receiver) = events::channel();
/// emitter.emit(EngineEvent::new("sess", 1, "ask", "presented question 1"));
/// assert_eq!(receiver.recv().unwrap().scope, "ask");
/// ```
#[must_use]
pub fn channel() -> (EventEmitter, flume::Receiver<EngineEvent>) {
    let (sender, receiver) = flume::unbounded();
    (
        EventEmitter {
            sender: Some(sender),
        },
        receiver,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_emitter_is_silent() {
        let emitter = EventEmitter::disabled();
        assert!(!emitter.is_enabled());
        emitter.emit(EngineEvent::new("s", 0, "ask", "m"));
    }

    #[test]
    fn connected_pair_delivers_in_order() {
        let (emitter, receiver) = channel();
        emitter.emit(EngineEvent::new("s", 1, "ask", "first"));
        emitter.emit(EngineEvent::new("s", 1, "record", "second"));
        assert_eq!(receiver.recv().unwrap().message, "first");
        assert_eq!(receiver.recv().unwrap().message, "second");
    }

    #[test]
    fn dropped_receiver_does_not_fail_emission() {
        let (emitter, receiver) = channel();
        drop(receiver);
        emitter.emit(EngineEvent::new("s", 1, "ask", "into the void"));
    }
}
