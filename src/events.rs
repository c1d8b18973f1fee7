//! Controller event stream
//!
//! Progress, state transitions, errors, and completion are published on a
//! broadcast channel so any number of observers (a UI, a logger, a test) can
//! subscribe without polling controller internals.

use crate::controller::ControllerState;
use crate::error::Error;
use tokio::sync::broadcast;

/// One event published by the Controller.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// Distance-based progress report
    Progress(ProgressEvent),
    /// Controller state machine transition
    StateChange(StateChangeEvent),
    /// A fail-fast error occurred; the controller has moved to CANCELLED
    Error(ErrorEvent),
    /// Program run to completion
    Completion(CompletionEvent),
}

/// Distance/ETA progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressEvent {
    /// Cumulative executed length, mm
    pub completed_mm: f64,
    /// Total length from prescan, if it ran
    pub total_mm: Option<f64>,
    /// `completed / total`, if total is known
    pub percent: Option<f64>,
    /// Estimated seconds remaining, if total and a last feedrate are known
    pub eta_s: Option<f64>,
}

/// A controller state machine transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChangeEvent {
    /// State transitioned from
    pub from: ControllerState,
    /// State transitioned to
    pub to: ControllerState,
}

/// A fail-fast error surfaced to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    /// The error itself
    pub error: Error,
    /// Source line number, if known
    pub line_number: Option<u32>,
}

/// Run-to-completion summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionEvent {
    /// Total length actually executed, mm
    pub total_executed_mm: f64,
}

/// Broadcasts `ControllerEvent`s to any number of subscribers.
///
/// Mirrors the teacher's broadcaster: a thin wrapper around
/// `tokio::sync::broadcast` that drops events on the floor if nobody is
/// listening rather than blocking the controller.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<ControllerEvent>,
}

impl EventBroadcaster {
    /// Create a broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe a new receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.sender.subscribe()
    }

    /// Publish an event. Silently ignored if there are no subscribers.
    pub fn publish(&self, event: ControllerEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBroadcaster::default();
        let mut rx = bus.subscribe();
        bus.publish(ControllerEvent::Completion(CompletionEvent {
            total_executed_mm: 42.0,
        }));
        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            ControllerEvent::Completion(CompletionEvent {
                total_executed_mm: 42.0
            })
        );
    }

    #[test]
    fn test_publish_with_no_subscribers_does_not_panic() {
        let bus = EventBroadcaster::default();
        bus.publish(ControllerEvent::Completion(CompletionEvent {
            total_executed_mm: 1.0,
        }));
    }
}
