// DeviationGate - accept/retry decision for a completed batch
//
// Only the accelerometer deviation is gated. Magnetometer deviation is
// computed and reported but ambient interference is not a reason to retry.

use crate::calibration::statistics::Statistics;
use crate::error::CalibrationError;

/// Default maximum accelerometer deviation magnitude, in raw counts
pub const DEFAULT_MAX_DEVIATION: f64 = 100.0;

/// Accept/reject gate on accelerometer noise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviationGate {
    threshold: f64,
}

impl DeviationGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Euclidean norm of the accelerometer stddev sub-vector
    pub fn magnitude(statistics: &Statistics) -> f64 {
        let [dx, dy, dz] = statistics.stddev.accelerometer();
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Accept iff the magnitude does not exceed the threshold
    pub fn accept(&self, statistics: &Statistics) -> bool {
        Self::magnitude(statistics) <= self.threshold
    }

    /// Gate a batch
    ///
    /// # Returns
    /// * `Ok(magnitude)` - batch accepted
    /// * `Err(CalibrationError::DeviationTooHigh)` - operator must retry the position
    pub fn evaluate(&self, statistics: &Statistics) -> Result<f64, CalibrationError> {
        let magnitude = Self::magnitude(statistics);
        if magnitude <= self.threshold {
            Ok(magnitude)
        } else {
            Err(CalibrationError::DeviationTooHigh {
                magnitude,
                threshold: self.threshold,
            })
        }
    }
}

impl Default for DeviationGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEVIATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::buffer::SampleBuffer;
    use crate::calibration::reading::SensorReading;
    use crate::calibration::statistics::StatisticsEngine;

    fn stats_with_stddev(stddev: SensorReading) -> Statistics {
        Statistics {
            min: SensorReading::ZERO,
            max: SensorReading::ZERO,
            mean: SensorReading::ZERO,
            stddev,
        }
    }

    fn compute(readings: &[SensorReading]) -> Statistics {
        let mut buffer = SampleBuffer::new(readings.len());
        for &r in readings {
            buffer.append(r).unwrap();
        }
        StatisticsEngine::compute(&buffer).unwrap()
    }

    #[test]
    fn test_steady_hold_is_accepted() {
        let stats = compute(&[
            SensorReading::new(100.0, 100.0, 100.0, 0.0, 0.0, 0.0),
            SensorReading::new(102.0, 98.0, 101.0, 0.0, 0.0, 0.0),
            SensorReading::new(99.0, 101.0, 99.0, 0.0, 0.0, 0.0),
            SensorReading::new(101.0, 99.0, 100.0, 0.0, 0.0, 0.0),
        ]);

        let gate = DeviationGate::default();
        assert!(gate.accept(&stats));
        assert!(gate.evaluate(&stats).unwrap() < 100.0);
    }

    #[test]
    fn test_shaky_hold_is_rejected() {
        let stats = compute(&[
            SensorReading::new(-50.0, 0.0, 4000.0, 0.0, 0.0, 0.0),
            SensorReading::new(250.0, 0.0, 4000.0, 0.0, 0.0, 0.0),
            SensorReading::new(-50.0, 0.0, 4000.0, 0.0, 0.0, 0.0),
            SensorReading::new(250.0, 0.0, 4000.0, 0.0, 0.0, 0.0),
        ]);

        let gate = DeviationGate::default();
        assert!(!gate.accept(&stats));
        match gate.evaluate(&stats) {
            Err(CalibrationError::DeviationTooHigh {
                magnitude,
                threshold,
            }) => {
                assert!((magnitude - 150.0).abs() < 1e-9);
                assert_eq!(threshold, 100.0);
            }
            other => panic!("Expected DeviationTooHigh, got {:?}", other),
        }
    }

    #[test]
    fn test_magnetometer_deviation_is_ignored() {
        let stats = stats_with_stddev(SensorReading::new(1.0, 1.0, 1.0, 900.0, 900.0, 900.0));
        assert!(DeviationGate::default().accept(&stats));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // 3-4-12 triangle: sqrt(9 + 16 + 144) = 13
        let stats = stats_with_stddev(SensorReading::new(3.0, 4.0, 12.0, 0.0, 0.0, 0.0));
        assert!(DeviationGate::new(13.0).accept(&stats));
        assert!(!DeviationGate::new(12.999).accept(&stats));
    }

    #[test]
    fn test_accept_is_monotonic_in_accelerometer_deviation() {
        let gate = DeviationGate::default();
        let mut rejected_seen = false;
        for step in 0..200 {
            let d = step as f64;
            let stats = stats_with_stddev(SensorReading::new(d, d / 2.0, 10.0, 5.0, 5.0, 5.0));
            let accepted = gate.accept(&stats);
            if rejected_seen {
                assert!(!accepted, "gate flipped back to accept at {}", d);
            }
            rejected_seen |= !accepted;
        }
        assert!(rejected_seen);
    }
}
