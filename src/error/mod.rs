// Error types for the motion calibrator
//
// This module defines custom error types for device and calibration operations,
// providing structured error handling with stable numeric error codes.

mod calibration;
mod device;
mod session;

pub use calibration::{log_calibration_error, CalibrationError, CalibrationErrorCodes};
pub use device::{log_device_error, DeviceError, DeviceErrorCodes};
pub use session::SessionError;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent reporting from the CLI
/// and from JSON event streams.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
