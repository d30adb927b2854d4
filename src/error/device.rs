// Device error types and constants

use crate::device::Transport;
use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Device error code constants
///
/// Error code range: 1001-1005
pub struct DeviceErrorCodes {}

impl DeviceErrorCodes {
    /// No controller is connected
    pub const NO_DEVICE: i32 = 1001;

    /// A controller was enumerated but the connection attempt failed
    pub const CONNECT_FAILED: i32 = 1002;

    /// Controller is connected over the wrong transport
    pub const WRONG_TRANSPORT: i32 = 1003;

    /// Reading sensor data from the controller failed
    pub const READ_FAILED: i32 = 1004;

    /// Controller went away mid-session
    pub const DISCONNECTED: i32 = 1005;
}

/// Log a device error with structured context
///
/// Emits the numeric code, the component and the human-readable message
/// so that a fatal device condition can be traced back from the log alone.
pub fn log_device_error(err: &DeviceError, context: &str) {
    error!(
        "Device error in {}: code={}, component=MotionController, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Device-related errors
///
/// Every variant is fatal to a calibration session: there is no partial
/// record and no resume capability.
///
/// Error code range: 1001-1005
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// No connected controller found at session start
    NoDevice,

    /// Controller enumerated but could not be opened
    ConnectFailed { reason: String },

    /// Controller present but not over the required transport
    WrongTransport {
        found: Transport,
        required: Transport,
    },

    /// Sensor read failed mid-collection
    ReadFailed { reason: String },

    /// Controller disconnected mid-session
    Disconnected,
}

impl ErrorCode for DeviceError {
    fn code(&self) -> i32 {
        match self {
            DeviceError::NoDevice => DeviceErrorCodes::NO_DEVICE,
            DeviceError::ConnectFailed { .. } => DeviceErrorCodes::CONNECT_FAILED,
            DeviceError::WrongTransport { .. } => DeviceErrorCodes::WRONG_TRANSPORT,
            DeviceError::ReadFailed { .. } => DeviceErrorCodes::READ_FAILED,
            DeviceError::Disconnected => DeviceErrorCodes::DISCONNECTED,
        }
    }

    fn message(&self) -> String {
        match self {
            DeviceError::NoDevice => "No controllers connected.".to_string(),
            DeviceError::ConnectFailed { reason } => {
                format!("Error connecting to the first controller: {}", reason)
            }
            DeviceError::WrongTransport { required, .. } => {
                format!(
                    "Please connect the controller via {}.",
                    required.display_name()
                )
            }
            DeviceError::ReadFailed { reason } => format!("Sensor read failed: {}", reason),
            DeviceError::Disconnected => "Controller disconnected".to_string(),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeviceError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for DeviceError {}
