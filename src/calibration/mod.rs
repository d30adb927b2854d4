// Calibration module - six-position accelerometer/magnetometer calibration
//
// This module provides the sampling-and-statistics engine:
// 1. SampleBuffer + StatisticsEngine: per-channel min/max/mean/deviation of a batch
// 2. DeviationGate: accept/retry decision on accelerometer noise
// 3. CalibrationSession: the per-orientation trigger/collect/evaluate loop
//
// The calibration workflow:
// 1. Open a CalibrationSession on a connected controller
// 2. For each orientation, press the trigger and hold still for N readings
// 3. Retry any orientation whose batch is too noisy
// 4. Hand the finalized record to a CalibrationSink

pub mod buffer;
pub mod events;
pub mod procedure;
pub mod progress;
pub mod reading;
pub mod state;
pub mod statistics;
pub mod trigger;
pub mod validation;

pub use buffer::SampleBuffer;
pub use events::{SessionEvent, SessionObserver};
pub use procedure::{CalibrationSession, SessionState, StepOutcome};
pub use progress::{CalibrationProgress, Orientation, OrientationSlot, POSITIONS};
pub use reading::SensorReading;
pub use state::{CalibrationRecord, FinalizedRecord, PositionEntry};
pub use statistics::{Statistics, StatisticsEngine};
pub use trigger::{TriggerEdge, TriggerPhase};
pub use validation::DeviationGate;
