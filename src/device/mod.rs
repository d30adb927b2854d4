// Device collaborator interfaces
//
// The calibration core never talks to HID or Bluetooth directly. It consumes
// a `DeviceBackend` that can enumerate and open a controller, and the opened
// `MotionController` that can be polled for trigger and sensor state.

pub mod replay;
pub mod synthetic;

pub use replay::{ReplayController, ReplayFrame, ReplayScript, ReplayTracker};
pub use synthetic::{SyntheticConfig, SyntheticController, MAX_NOISE};

use crate::error::DeviceError;

/// Link the controller is attached over
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Bluetooth,
    Usb,
    Unknown,
}

impl Transport {
    pub fn display_name(&self) -> &'static str {
        match self {
            Transport::Bluetooth => "Bluetooth",
            Transport::Usb => "USB",
            Transport::Unknown => "unknown transport",
        }
    }
}

/// An opened controller
pub trait MotionController {
    /// Transport the controller is connected over
    fn transport(&self) -> Transport;

    /// Serial identity string (typically a Bluetooth address)
    fn serial(&self) -> String;

    /// Fetch the next input report
    ///
    /// # Returns
    /// * `Ok(true)` - fresh trigger and sensor values are available
    /// * `Ok(false)` - nothing new yet; try again after a short delay
    /// * `Err(DeviceError)` - the controller failed; fatal to the session
    fn poll(&mut self) -> Result<bool, DeviceError>;

    /// Trigger state from the last fresh report
    fn trigger_pressed(&self) -> bool;

    /// Raw accelerometer counts from the last fresh report
    fn accelerometer(&self) -> [i32; 3];

    /// Raw magnetometer counts from the last fresh report
    fn magnetometer(&self) -> [i32; 3];

    /// Release the controller
    fn disconnect(&mut self);
}

/// Enumerates and opens controllers
pub trait DeviceBackend {
    type Controller: MotionController;

    /// Number of controllers currently connected
    fn count_connected(&mut self) -> usize;

    /// Open the first connected controller
    fn connect(&mut self) -> Result<Self::Controller, DeviceError>;
}

/// Backend holding at most one already-constructed controller
///
/// Used for replayed and simulated controllers, which exist before any
/// enumeration happens.
pub struct AttachedBackend<C> {
    controller: Option<C>,
}

impl<C: MotionController> AttachedBackend<C> {
    pub fn new(controller: C) -> Self {
        Self {
            controller: Some(controller),
        }
    }

    /// Backend with nothing attached
    pub fn empty() -> Self {
        Self { controller: None }
    }
}

impl<C: MotionController> DeviceBackend for AttachedBackend<C> {
    type Controller = C;

    fn count_connected(&mut self) -> usize {
        usize::from(self.controller.is_some())
    }

    fn connect(&mut self) -> Result<C, DeviceError> {
        self.controller.take().ok_or(DeviceError::NoDevice)
    }
}
