// StatisticsEngine - per-channel min/max/mean/deviation of a full batch
//
// The batch is treated as the whole population under test, so the variance
// divides by N rather than N - 1.

use serde::{Deserialize, Serialize};

use crate::calibration::buffer::SampleBuffer;
use crate::calibration::reading::SensorReading;
use crate::error::CalibrationError;

/// Derived statistics for one batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub min: SensorReading,
    pub max: SensorReading,
    pub mean: SensorReading,
    /// Population standard deviation per channel (never negative)
    pub stddev: SensorReading,
}

/// Stateless aggregator over a full `SampleBuffer`
pub struct StatisticsEngine;

impl StatisticsEngine {
    /// Compute statistics for a full buffer
    ///
    /// # Errors
    /// * `CalibrationError::IncompleteBuffer` - buffer is not full (or has zero capacity)
    pub fn compute(buffer: &SampleBuffer) -> Result<Statistics, CalibrationError> {
        let readings = buffer.readings();
        if !buffer.is_full() || readings.is_empty() {
            return Err(CalibrationError::IncompleteBuffer {
                collected: buffer.len(),
                required: buffer.capacity(),
            });
        }

        let n = readings.len() as f64;
        let first = readings[0];

        let (min, max, sum) = readings[1..]
            .iter()
            .fold((first, first, first), |(min, max, sum), &cur| {
                (min.component_min(cur), max.component_max(cur), sum + cur)
            });
        let mean = sum / n;

        let squared = readings.iter().fold(SensorReading::ZERO, |acc, &cur| {
            let diff = cur - mean;
            acc + diff * diff
        });
        let stddev = (squared / n).map(f64::sqrt);

        Ok(Statistics {
            min,
            max,
            mean,
            stddev,
        })
    }
}
