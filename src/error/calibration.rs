// Calibration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Calibration error code constants
///
/// Error code range: 2001-2007
pub struct CalibrationErrorCodes {}

impl CalibrationErrorCodes {
    /// Append attempted on a full sample buffer
    pub const BUFFER_FULL: i32 = 2001;

    /// Statistics requested on a partially filled buffer
    pub const INCOMPLETE_BUFFER: i32 = 2002;

    /// Accelerometer deviation above the acceptance threshold
    pub const DEVIATION_TOO_HIGH: i32 = 2003;

    /// Record finalized before every position was accepted
    pub const NOT_COMPLETE: i32 = 2004;

    /// Configuration values out of range
    pub const INVALID_CONFIG: i32 = 2005;

    /// Writing the calibration file failed
    pub const PERSISTENCE: i32 = 2006;

    /// Replay script could not be loaded
    pub const INVALID_REPLAY: i32 = 2007;
}

/// Log a calibration error with structured context
///
/// This function logs calibration errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
pub fn log_calibration_error(err: &CalibrationError, context: &str) {
    error!(
        "Calibration error in {}: code={}, component=CalibrationSession, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Calibration-related errors
///
/// `BufferFull` and `IncompleteBuffer` are internal contract violations and
/// only surface if the session state machine is broken. `DeviationTooHigh`
/// is the expected retry signal and never leaves the evaluation step.
///
/// Error code range: 2001-2007
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Append attempted beyond capacity
    BufferFull { capacity: usize },

    /// Statistics requested before the batch was complete
    IncompleteBuffer { collected: usize, required: usize },

    /// Batch rejected by the deviation gate
    DeviationTooHigh { magnitude: f64, threshold: f64 },

    /// Record finalized with missing positions
    NotComplete { accepted: usize, required: usize },

    /// Configuration rejected by validation
    InvalidConfig { reason: String },

    /// Calibration file could not be written
    Persistence { reason: String },

    /// Replay script missing or malformed
    InvalidReplay { reason: String },
}

impl ErrorCode for CalibrationError {
    fn code(&self) -> i32 {
        match self {
            CalibrationError::BufferFull { .. } => CalibrationErrorCodes::BUFFER_FULL,
            CalibrationError::IncompleteBuffer { .. } => CalibrationErrorCodes::INCOMPLETE_BUFFER,
            CalibrationError::DeviationTooHigh { .. } => CalibrationErrorCodes::DEVIATION_TOO_HIGH,
            CalibrationError::NotComplete { .. } => CalibrationErrorCodes::NOT_COMPLETE,
            CalibrationError::InvalidConfig { .. } => CalibrationErrorCodes::INVALID_CONFIG,
            CalibrationError::Persistence { .. } => CalibrationErrorCodes::PERSISTENCE,
            CalibrationError::InvalidReplay { .. } => CalibrationErrorCodes::INVALID_REPLAY,
        }
    }

    fn message(&self) -> String {
        match self {
            CalibrationError::BufferFull { capacity } => {
                format!("Sample buffer full: capacity {}", capacity)
            }
            CalibrationError::IncompleteBuffer { collected, required } => {
                format!("Incomplete buffer: need {}, got {}", required, collected)
            }
            CalibrationError::DeviationTooHigh { magnitude, threshold } => {
                format!("Deviation too high: {:.2} exceeds {:.2}", magnitude, threshold)
            }
            CalibrationError::NotComplete { accepted, required } => {
                format!("Calibration not complete: {}/{} positions accepted", accepted, required)
            }
            CalibrationError::InvalidConfig { reason } => {
                format!("Invalid configuration: {}", reason)
            }
            CalibrationError::Persistence { reason } => {
                format!("Failed to write calibration: {}", reason)
            }
            CalibrationError::InvalidReplay { reason } => {
                format!("Invalid replay script: {}", reason)
            }
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalibrationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CalibrationError {}
