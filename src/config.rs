//! Configuration management for calibration runs
//!
//! Sample count, deviation threshold and poll pacing are compiled-in defaults
//! that can be overridden from a JSON file (and, by the CLI, from flags).
//! Orientation labels are not configurable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::calibration::buffer::DEFAULT_SAMPLES_PER_POSITION;
use crate::calibration::validation::DEFAULT_MAX_DEVIATION;
use crate::device::Transport;
use crate::error::CalibrationError;

/// Upper bound on readings per position accepted by `validate`
pub const MAX_SAMPLES_PER_POSITION: usize = 1_000_000;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub calibration: CalibrationConfig,
    pub device: DeviceConfig,
    pub output: OutputConfig,
}

/// Calibration procedure configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Number of readings collected per position
    pub samples_per_position: usize,
    /// Maximum accelerometer deviation magnitude (raw counts)
    pub max_deviation: f64,
    /// Sleep between poll attempts that yield nothing new
    pub poll_interval_ms: u64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            samples_per_position: DEFAULT_SAMPLES_PER_POSITION,
            max_deviation: DEFAULT_MAX_DEVIATION,
            poll_interval_ms: 10,
        }
    }
}

impl CalibrationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Controller requirements
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Transport the controller must be connected over
    pub required_transport: Transport,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            required_transport: Transport::Bluetooth,
        }
    }
}

/// Calibration file output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the calibration file is written to
    pub directory: PathBuf,
    /// Append the magnetometer mean to each line
    pub persist_magnetometer: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            persist_magnetometer: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults if the file doesn't exist or
    /// the JSON is invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Reject values the session cannot run with
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let samples = self.calibration.samples_per_position;
        if samples == 0 {
            return Err(CalibrationError::InvalidConfig {
                reason: "samples_per_position must be at least 1".to_string(),
            });
        }
        if samples > MAX_SAMPLES_PER_POSITION {
            return Err(CalibrationError::InvalidConfig {
                reason: format!(
                    "samples_per_position {} exceeds the maximum of {}",
                    samples, MAX_SAMPLES_PER_POSITION
                ),
            });
        }
        let threshold = self.calibration.max_deviation;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(CalibrationError::InvalidConfig {
                reason: format!("max_deviation {} must be finite and >= 0", threshold),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.calibration.samples_per_position, 200);
        assert_eq!(config.calibration.max_deviation, 100.0);
        assert_eq!(config.calibration.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.device.required_transport, Transport::Bluetooth);
        assert!(!config.output.persist_magnetometer);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(
            parsed.calibration.samples_per_position,
            config.calibration.samples_per_position
        );
        assert_eq!(parsed.output.directory, config.output.directory);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"calibration": {"samples_per_position": 50}}"#).unwrap();
        assert_eq!(parsed.calibration.samples_per_position, 50);
        assert_eq!(parsed.calibration.max_deviation, 100.0);
        assert_eq!(parsed.device.required_transport, Transport::Bluetooth);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/motion_calibrator.json");
        assert_eq!(config.calibration.samples_per_position, 200);
    }

    #[test]
    fn test_validate_rejects_zero_samples() {
        let mut config = AppConfig::default();
        config.calibration.samples_per_position = 0;
        assert!(matches!(
            config.validate(),
            Err(CalibrationError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_sample_count() {
        let mut config = AppConfig::default();
        config.calibration.samples_per_position = MAX_SAMPLES_PER_POSITION;
        assert!(config.validate().is_ok());

        for samples in [MAX_SAMPLES_PER_POSITION + 1, usize::MAX] {
            config.calibration.samples_per_position = samples;
            assert!(matches!(
                config.validate(),
                Err(CalibrationError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = AppConfig::default();
        config.calibration.max_deviation = f64::NAN;
        assert!(config.validate().is_err());
        config.calibration.max_deviation = -1.0;
        assert!(config.validate().is_err());
    }
}
