// Session-level error wrapping device and calibration failures

use crate::error::{CalibrationError, DeviceError, ErrorCode};
use std::fmt;

/// Fatal condition that terminates a calibration session
///
/// The session never persists a partial record once one of these is
/// returned.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    Device(DeviceError),
    Calibration(CalibrationError),
}

impl From<DeviceError> for SessionError {
    fn from(err: DeviceError) -> Self {
        SessionError::Device(err)
    }
}

impl From<CalibrationError> for SessionError {
    fn from(err: CalibrationError) -> Self {
        SessionError::Calibration(err)
    }
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::Device(err) => err.code(),
            SessionError::Calibration(err) => err.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::Device(err) => err.message(),
            SessionError::Calibration(err) => err.message(),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Device(err) => write!(f, "{}", err),
            SessionError::Calibration(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Device(err) => Some(err),
            SessionError::Calibration(err) => Some(err),
        }
    }
}
