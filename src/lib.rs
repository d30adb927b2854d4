// Motion Calibrator Core
// Six-position accelerometer + magnetometer calibration for handheld controllers

// Module declarations
pub mod calibration;
pub mod config;
pub mod device;
pub mod error;
pub mod storage;

// Re-exports for convenience
pub use calibration::{CalibrationSession, FinalizedRecord, Orientation, SessionEvent};
pub use config::AppConfig;
pub use error::{CalibrationError, DeviceError, ErrorCode, SessionError};

use tracing::Level;

/// Initialize logging to stderr
///
/// `log` records are forwarded through the subscriber's log bridge. Calling
/// this more than once is harmless.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
