// Progress tracking for the calibration workflow
//
// This module provides the closed set of calibration orientations, the
// per-orientation slot that owns the sample buffer, and the progress snapshot
// reported to observers.

use crate::calibration::buffer::SampleBuffer;
use crate::calibration::statistics::Statistics;

/// Number of orientations in a complete calibration
pub const POSITIONS: usize = 6;

/// Physical orientation the controller is held in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    BulbUp,
    BulbDown,
    ButtonsUp,
    ButtonsDown,
    ButtonsLeft,
    ButtonsRight,
}

impl Orientation {
    /// Canonical calibration order
    pub const ALL: [Orientation; POSITIONS] = [
        Orientation::BulbUp,
        Orientation::BulbDown,
        Orientation::ButtonsUp,
        Orientation::ButtonsDown,
        Orientation::ButtonsLeft,
        Orientation::ButtonsRight,
    ];

    /// First orientation of a session
    pub fn first() -> Orientation {
        Orientation::BulbUp
    }

    /// Get the next orientation in the calibration sequence
    ///
    /// # Returns
    /// * `Some(Orientation)` - Next orientation to calibrate
    /// * `None` - Calibration sequence complete
    pub fn next(&self) -> Option<Orientation> {
        match self {
            Orientation::BulbUp => Some(Orientation::BulbDown),
            Orientation::BulbDown => Some(Orientation::ButtonsUp),
            Orientation::ButtonsUp => Some(Orientation::ButtonsDown),
            Orientation::ButtonsDown => Some(Orientation::ButtonsLeft),
            Orientation::ButtonsLeft => Some(Orientation::ButtonsRight),
            Orientation::ButtonsRight => None,
        }
    }

    /// Slot index in the calibration record
    pub fn index(&self) -> usize {
        match self {
            Orientation::BulbUp => 0,
            Orientation::BulbDown => 1,
            Orientation::ButtonsUp => 2,
            Orientation::ButtonsDown => 3,
            Orientation::ButtonsLeft => 4,
            Orientation::ButtonsRight => 5,
        }
    }

    /// Get human-readable name for display
    pub fn label(&self) -> &'static str {
        match self {
            Orientation::BulbUp => "bulb up",
            Orientation::BulbDown => "bulb down",
            Orientation::ButtonsUp => "buttons up",
            Orientation::ButtonsDown => "buttons down",
            Orientation::ButtonsLeft => "buttons left",
            Orientation::ButtonsRight => "buttons right",
        }
    }
}

/// One orientation's collection phase
///
/// Owns the batch buffer while the orientation is in progress. The
/// statistics are overwritten on every retry.
#[derive(Debug, Clone)]
pub struct OrientationSlot {
    orientation: Orientation,
    buffer: SampleBuffer,
    statistics: Option<Statistics>,
    attempts: u32,
}

impl OrientationSlot {
    pub fn new(orientation: Orientation, samples_per_position: usize) -> Self {
        Self {
            orientation,
            buffer: SampleBuffer::new(samples_per_position),
            statistics: None,
            attempts: 0,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut SampleBuffer {
        &mut self.buffer
    }

    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    /// Number of batches started for this orientation
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Begin a new batch: discard prior readings and count the attempt
    pub fn begin_attempt(&mut self) {
        self.buffer.reset();
        self.attempts += 1;
    }

    pub fn set_statistics(&mut self, statistics: Statistics) {
        self.statistics = Some(statistics);
    }
}

/// Progress information for the current calibration step
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CalibrationProgress {
    /// Orientation currently being calibrated (None once done)
    pub current: Option<Orientation>,
    /// Number of orientations already accepted
    pub positions_accepted: usize,
    /// Readings collected in the current batch
    pub samples_collected: usize,
    /// Readings needed per batch
    pub samples_needed: usize,
    /// Batches started for the current orientation
    pub attempts: u32,
}

impl CalibrationProgress {
    /// Check if entire calibration is complete
    pub fn is_calibration_complete(&self) -> bool {
        self.positions_accepted == POSITIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_sequence_matches_all() {
        let mut seq = vec![Orientation::first()];
        while let Some(next) = seq.last().and_then(|o| o.next()) {
            seq.push(next);
        }
        assert_eq!(seq, Orientation::ALL.to_vec());
        for (i, o) in Orientation::ALL.iter().enumerate() {
            assert_eq!(o.index(), i);
        }
    }

    #[test]
    fn test_orientation_labels() {
        assert_eq!(Orientation::BulbUp.label(), "bulb up");
        assert_eq!(Orientation::ButtonsRight.label(), "buttons right");
    }

    #[test]
    fn test_orientation_serializes_snake_case() {
        let json = serde_json::to_string(&Orientation::ButtonsLeft).unwrap();
        assert_eq!(json, "\"buttons_left\"");
    }

    #[test]
    fn test_slot_begin_attempt_resets_buffer() {
        let mut slot = OrientationSlot::new(Orientation::BulbDown, 2);
        slot.begin_attempt();
        slot.buffer_mut()
            .append(crate::calibration::reading::SensorReading::ZERO)
            .unwrap();
        assert_eq!(slot.buffer().len(), 1);

        slot.begin_attempt();
        assert!(slot.buffer().is_empty());
        assert_eq!(slot.attempts(), 2);
    }

    #[test]
    fn test_progress_calibration_complete() {
        let mut progress = CalibrationProgress {
            current: Some(Orientation::ButtonsUp),
            positions_accepted: 2,
            samples_collected: 100,
            samples_needed: 200,
            attempts: 1,
        };
        assert!(!progress.is_calibration_complete());

        progress.current = None;
        progress.positions_accepted = POSITIONS;
        assert!(progress.is_calibration_complete());
    }
}
