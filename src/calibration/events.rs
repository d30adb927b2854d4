//! Session events describing calibration progress to an operator-facing
//! surface (terminal prompts, JSON lines).

use serde::Serialize;

use crate::calibration::progress::Orientation;
use crate::calibration::statistics::Statistics;
use crate::device::Transport;

/// Everything an operator-facing surface needs to follow a session.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    Connected {
        serial: String,
        transport: Transport,
    },
    AwaitingTrigger {
        orientation: Orientation,
        attempt: u32,
    },
    ReadingCollected {
        orientation: Orientation,
        collected: usize,
        needed: usize,
    },
    BatchEvaluated {
        orientation: Orientation,
        statistics: Statistics,
        deviation_magnitude: f64,
        accepted: bool,
    },
    RetryRequested {
        orientation: Orientation,
        deviation_magnitude: f64,
        threshold: f64,
    },
    PositionAccepted {
        orientation: Orientation,
        attempts: u32,
    },
    Completed {
        serial: String,
    },
}

/// Receives session events as they happen.
pub trait SessionObserver {
    fn on_event(&mut self, event: &SessionEvent);
}

/// Discards every event.
impl SessionObserver for () {
    fn on_event(&mut self, _event: &SessionEvent) {}
}

/// Collects events in memory.
impl SessionObserver for Vec<SessionEvent> {
    fn on_event(&mut self, event: &SessionEvent) {
        self.push(event.clone());
    }
}

/// Forwards to a borrowed observer so the caller keeps ownership.
impl<O: SessionObserver + ?Sized> SessionObserver for &mut O {
    fn on_event(&mut self, event: &SessionEvent) {
        (**self).on_event(event)
    }
}
