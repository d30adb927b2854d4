// TriggerEdge - two-phase release -> press detector
//
// A press that is already held when waiting starts does not count. The
// detector must first see the trigger released, then pressed again, so the
// press that finished one position cannot also start the next.

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPhase {
    /// Waiting to observe the trigger released
    AwaitingRelease,
    /// Release seen; waiting for a fresh press
    AwaitingPress,
}

#[derive(Debug, Clone, Copy)]
pub struct TriggerEdge {
    phase: TriggerPhase,
}

impl TriggerEdge {
    pub fn new() -> Self {
        Self {
            phase: TriggerPhase::AwaitingRelease,
        }
    }

    pub fn phase(&self) -> TriggerPhase {
        self.phase
    }

    /// Feed one fresh trigger sample
    ///
    /// # Returns
    /// `true` exactly once per release -> press edge
    pub fn observe(&mut self, pressed: bool) -> bool {
        match (self.phase, pressed) {
            (TriggerPhase::AwaitingRelease, false) => {
                self.phase = TriggerPhase::AwaitingPress;
                false
            }
            (TriggerPhase::AwaitingPress, true) => {
                self.phase = TriggerPhase::AwaitingRelease;
                true
            }
            _ => false,
        }
    }
}

impl Default for TriggerEdge {
    fn default() -> Self {
        Self::new()
    }
}
