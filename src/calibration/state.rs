// CalibrationRecord - accepted per-orientation results
//
// The record is created empty when a session starts and is filled one slot
// at a time as batches pass the deviation gate. Finalizing consumes it and
// yields a read-only `FinalizedRecord` with all six entries in canonical
// orientation order.

use serde::Serialize;

use crate::calibration::progress::{Orientation, POSITIONS};
use crate::calibration::statistics::Statistics;
use crate::error::CalibrationError;

/// Result of one accepted batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionEntry {
    pub orientation: Orientation,
    pub statistics: Statistics,
    /// Accelerometer deviation magnitude at acceptance time
    pub deviation_magnitude: f64,
}

impl PositionEntry {
    /// Accelerometer mean (the persisted calibration value)
    pub fn accelerometer_mean(&self) -> [f64; 3] {
        self.statistics.mean.accelerometer()
    }

    pub fn magnetometer_mean(&self) -> [f64; 3] {
        self.statistics.mean.magnetometer()
    }
}

/// In-progress record owned by the session
#[derive(Debug, Clone)]
pub struct CalibrationRecord {
    serial: String,
    entries: [Option<PositionEntry>; POSITIONS],
}

impl CalibrationRecord {
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            entries: [None; POSITIONS],
        }
    }

    /// Store an accepted batch at its orientation's slot
    ///
    /// A later commit for the same orientation overwrites the earlier one.
    pub fn commit(&mut self, entry: PositionEntry) {
        self.entries[entry.orientation.index()] = Some(entry);
    }

    pub fn get(&self, orientation: Orientation) -> Option<&PositionEntry> {
        self.entries[orientation.index()].as_ref()
    }

    pub fn accepted(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.accepted() == POSITIONS
    }

    /// Finalize the record
    ///
    /// # Errors
    /// * `CalibrationError::NotComplete` - at least one orientation is missing
    pub fn finalize(self) -> Result<FinalizedRecord, CalibrationError> {
        let accepted = self.accepted();
        let mut entries = Vec::with_capacity(POSITIONS);
        for slot in self.entries {
            match slot {
                Some(entry) => entries.push(entry),
                None => {
                    return Err(CalibrationError::NotComplete {
                        accepted,
                        required: POSITIONS,
                    })
                }
            }
        }

        let entries: [PositionEntry; POSITIONS] =
            entries.try_into().map_err(|_| CalibrationError::NotComplete {
                accepted,
                required: POSITIONS,
            })?;

        Ok(FinalizedRecord {
            serial: self.serial,
            entries,
        })
    }
}

/// Completed calibration handed to the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalizedRecord {
    serial: String,
    entries: [PositionEntry; POSITIONS],
}

impl FinalizedRecord {
    /// Device serial identity as reported by the controller
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Entries in canonical orientation order
    pub fn entries(&self) -> &[PositionEntry; POSITIONS] {
        &self.entries
    }

    /// Accelerometer means in canonical orientation order
    pub fn accelerometer_means(&self) -> [[f64; 3]; POSITIONS] {
        self.entries.map(|e| e.accelerometer_mean())
    }
}
