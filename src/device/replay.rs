// ReplayController - controller driven by a recorded JSON script
//
// Each frame describes the outcome of one `poll` call. Running past the end
// of the script reports a disconnect, which lets a truncated recording
// exercise the fatal-error path.

use std::cell::Cell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::device::{MotionController, Transport};
use crate::error::{CalibrationError, DeviceError};

fn default_fresh() -> bool {
    true
}

fn default_repeat() -> usize {
    1
}

/// One (possibly repeated) poll outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Whether the poll yields a fresh report
    #[serde(default = "default_fresh")]
    pub fresh: bool,
    #[serde(default)]
    pub trigger: bool,
    #[serde(default)]
    pub accel: [i32; 3],
    #[serde(default)]
    pub mag: [i32; 3],
    /// Poll fails with this read error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
    /// Number of consecutive polls producing this frame
    #[serde(default = "default_repeat")]
    pub repeat: usize,
}

impl ReplayFrame {
    /// Fresh report with the given trigger and sensor values
    pub fn reading(trigger: bool, accel: [i32; 3], mag: [i32; 3]) -> Self {
        Self {
            fresh: true,
            trigger,
            accel,
            mag,
            fail: None,
            repeat: 1,
        }
    }

    /// Fresh report carrying only a trigger state
    pub fn trigger(pressed: bool) -> Self {
        Self::reading(pressed, [0; 3], [0; 3])
    }

    /// Poll with no new data
    pub fn stale() -> Self {
        Self {
            fresh: false,
            ..Self::trigger(false)
        }
    }

    /// Poll that fails with a read error
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            fail: Some(reason.into()),
            ..Self::trigger(false)
        }
    }

    pub fn times(mut self, repeat: usize) -> Self {
        self.repeat = repeat;
        self
    }
}

/// Recorded controller session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub serial: String,
    pub transport: Transport,
    pub frames: Vec<ReplayFrame>,
}

impl ReplayScript {
    pub fn new(serial: impl Into<String>, transport: Transport, frames: Vec<ReplayFrame>) -> Self {
        Self {
            serial: serial.into(),
            transport,
            frames,
        }
    }

    /// Load a script from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CalibrationError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| CalibrationError::InvalidReplay {
            reason: format!("reading {}: {}", path.display(), err),
        })?;
        serde_json::from_str(&contents).map_err(|err| CalibrationError::InvalidReplay {
            reason: format!("parsing {}: {}", path.display(), err),
        })
    }

    /// Total number of polls the script answers
    pub fn total_polls(&self) -> usize {
        self.frames.iter().map(|f| f.repeat).sum()
    }
}

/// Shared view of a replay controller's consumption, valid after the
/// controller has been moved into a session
#[derive(Debug, Clone, Default)]
pub struct ReplayTracker {
    polls: Rc<Cell<usize>>,
    disconnects: Rc<Cell<usize>>,
}

impl ReplayTracker {
    pub fn polls(&self) -> usize {
        self.polls.get()
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.get()
    }
}

pub struct ReplayController {
    script: ReplayScript,
    frame_index: usize,
    repeat_used: usize,
    trigger: bool,
    accel: [i32; 3],
    mag: [i32; 3],
    tracker: ReplayTracker,
}

impl ReplayController {
    pub fn new(script: ReplayScript) -> Self {
        Self {
            script,
            frame_index: 0,
            repeat_used: 0,
            trigger: false,
            accel: [0; 3],
            mag: [0; 3],
            tracker: ReplayTracker::default(),
        }
    }

    pub fn tracker(&self) -> ReplayTracker {
        self.tracker.clone()
    }

    fn next_frame(&mut self) -> Option<ReplayFrame> {
        loop {
            let frame = self.script.frames.get(self.frame_index)?;
            if self.repeat_used < frame.repeat {
                self.repeat_used += 1;
                return Some(frame.clone());
            }
            self.frame_index += 1;
            self.repeat_used = 0;
        }
    }
}

impl MotionController for ReplayController {
    fn transport(&self) -> Transport {
        self.script.transport
    }

    fn serial(&self) -> String {
        self.script.serial.clone()
    }

    fn poll(&mut self) -> Result<bool, DeviceError> {
        let frame = self.next_frame().ok_or(DeviceError::Disconnected)?;
        self.tracker.polls.set(self.tracker.polls.get() + 1);

        if let Some(reason) = frame.fail {
            return Err(DeviceError::ReadFailed { reason });
        }
        if frame.fresh {
            self.trigger = frame.trigger;
            self.accel = frame.accel;
            self.mag = frame.mag;
        }
        Ok(frame.fresh)
    }

    fn trigger_pressed(&self) -> bool {
        self.trigger
    }

    fn accelerometer(&self) -> [i32; 3] {
        self.accel
    }

    fn magnetometer(&self) -> [i32; 3] {
        self.mag
    }

    fn disconnect(&mut self) {
        log::info!(
            "[ReplayController] Disconnecting {} after {} polls",
            self.script.serial,
            self.tracker.polls()
        );
        self.tracker
            .disconnects
            .set(self.tracker.disconnects.get() + 1);
    }
}
