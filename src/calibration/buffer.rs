// SampleBuffer - fixed-capacity batch of readings for one orientation
//
// The buffer is allocated once per orientation and refilled from scratch on
// every retry. `reset` only rewinds the fill count; capacity is retained.

use crate::calibration::reading::SensorReading;
use crate::error::CalibrationError;

/// Default number of readings collected per position
pub const DEFAULT_SAMPLES_PER_POSITION: usize = 200;

/// Fixed-capacity store of raw readings
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    readings: Vec<SensorReading>,
    capacity: usize,
}

impl SampleBuffer {
    /// Create an empty buffer holding exactly `capacity` readings
    pub fn new(capacity: usize) -> Self {
        Self {
            readings: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Logically discard all readings, keeping the allocation
    pub fn reset(&mut self) {
        self.readings.clear();
    }

    /// Store `reading` at index `len()`
    ///
    /// # Errors
    /// * `CalibrationError::BufferFull` - buffer already holds `capacity` readings
    pub fn append(&mut self, reading: SensorReading) -> Result<(), CalibrationError> {
        if self.is_full() {
            return Err(CalibrationError::BufferFull {
                capacity: self.capacity,
            });
        }
        self.readings.push(reading);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.readings.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Filled portion of the buffer
    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLES_PER_POSITION)
    }
}
