// CalibrationSession - per-orientation collection state machine
//
// For each of the six orientations the session:
// 1. Waits for a fresh trigger press (release first, then press)
// 2. Resets the slot buffer and collects N readings
// 3. Computes statistics and applies the deviation gate
// 4. Commits the batch on acceptance, or returns to step 1 for the same
//    orientation on rejection
//
// `step` performs one poll attempt or one transition so each state can be
// driven and inspected on its own; `run` loops it with a fixed sleep.

use std::ops::{Deref, DerefMut};
use std::thread;
use std::time::Duration;

use crate::calibration::events::{SessionEvent, SessionObserver};
use crate::calibration::progress::{CalibrationProgress, Orientation, OrientationSlot};
use crate::calibration::reading::SensorReading;
use crate::calibration::state::{CalibrationRecord, FinalizedRecord, PositionEntry};
use crate::calibration::statistics::StatisticsEngine;
use crate::calibration::trigger::{TriggerEdge, TriggerPhase};
use crate::calibration::validation::DeviationGate;
use crate::config::AppConfig;
use crate::device::{DeviceBackend, MotionController};
use crate::error::{
    log_calibration_error, log_device_error, CalibrationError, DeviceError, SessionError,
};
use crate::storage::CalibrationSink;

/// Where the session currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingTrigger(Orientation),
    Collecting(Orientation),
    Evaluating(Orientation),
    Done,
}

impl SessionState {
    pub fn orientation(&self) -> Option<Orientation> {
        match self {
            SessionState::AwaitingTrigger(o)
            | SessionState::Collecting(o)
            | SessionState::Evaluating(o) => Some(*o),
            SessionState::Done => None,
        }
    }
}

/// Result of a single `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing new was observed; sleep one poll interval before retrying
    Idle,
    /// The state machine made progress
    Advanced,
    /// All orientations accepted
    Done,
}

/// Exclusive ownership of the opened controller, released on drop
struct Connection<C: MotionController> {
    controller: C,
}

impl<C: MotionController> Deref for Connection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.controller
    }
}

impl<C: MotionController> DerefMut for Connection<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.controller
    }
}

impl<C: MotionController> Drop for Connection<C> {
    fn drop(&mut self) {
        self.controller.disconnect();
    }
}

/// Interactive six-position calibration of one controller
pub struct CalibrationSession<C: MotionController, O: SessionObserver = ()> {
    connection: Connection<C>,
    serial: String,
    gate: DeviationGate,
    samples_per_position: usize,
    poll_interval: Duration,
    state: SessionState,
    trigger: TriggerEdge,
    slot: OrientationSlot,
    record: CalibrationRecord,
    observer: O,
    started: bool,
}

impl<C: MotionController> CalibrationSession<C> {
    /// Connect to the first controller and prepare a session
    ///
    /// # Errors
    /// * `DeviceError::NoDevice` - nothing connected
    /// * `DeviceError::ConnectFailed` - connection attempt failed
    /// * `DeviceError::WrongTransport` - controller not on the required transport
    /// * `CalibrationError::InvalidConfig` - config rejected by validation
    pub fn open<B>(backend: &mut B, config: &AppConfig) -> Result<Self, SessionError>
    where
        B: DeviceBackend<Controller = C>,
    {
        config
            .validate()
            .inspect_err(|err| log_calibration_error(err, "open_session"))?;

        if backend.count_connected() < 1 {
            let err = DeviceError::NoDevice;
            log_device_error(&err, "open_session");
            return Err(err.into());
        }

        let controller = backend
            .connect()
            .inspect_err(|err| log_device_error(err, "open_session"))?;
        // From here on the controller is released on every exit path.
        let connection = Connection { controller };

        let required = config.device.required_transport;
        let found = connection.transport();
        if found != required {
            let err = DeviceError::WrongTransport { found, required };
            log_device_error(&err, "open_session");
            return Err(err.into());
        }

        let serial = connection.serial();
        log::info!(
            "[CalibrationSession] Connected to {} over {}",
            serial,
            found.display_name()
        );

        let samples_per_position = config.calibration.samples_per_position;
        let first = Orientation::first();
        Ok(Self {
            connection,
            record: CalibrationRecord::new(serial.clone()),
            serial,
            gate: DeviationGate::new(config.calibration.max_deviation),
            samples_per_position,
            poll_interval: config.calibration.poll_interval(),
            state: SessionState::AwaitingTrigger(first),
            trigger: TriggerEdge::new(),
            slot: OrientationSlot::new(first, samples_per_position),
            observer: (),
            started: false,
        })
    }
}

impl<C: MotionController, O: SessionObserver> CalibrationSession<C, O> {
    /// Replace the event observer
    pub fn with_observer<O2: SessionObserver>(self, observer: O2) -> CalibrationSession<C, O2> {
        CalibrationSession {
            connection: self.connection,
            serial: self.serial,
            gate: self.gate,
            samples_per_position: self.samples_per_position,
            poll_interval: self.poll_interval,
            state: self.state,
            trigger: self.trigger,
            slot: self.slot,
            record: self.record,
            observer,
            started: self.started,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn gate(&self) -> &DeviationGate {
        &self.gate
    }

    /// Slot for the orientation in progress
    pub fn slot(&self) -> &OrientationSlot {
        &self.slot
    }

    pub fn record(&self) -> &CalibrationRecord {
        &self.record
    }

    pub fn trigger_phase(&self) -> TriggerPhase {
        self.trigger.phase()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Get current calibration progress
    pub fn progress(&self) -> CalibrationProgress {
        CalibrationProgress {
            current: self.state.orientation(),
            positions_accepted: self.record.accepted(),
            samples_collected: self.slot.buffer().len(),
            samples_needed: self.samples_per_position,
            attempts: self.slot.attempts(),
        }
    }

    /// Advance the state machine by one poll attempt or transition
    ///
    /// # Errors
    /// Any device failure; contract violations in the sample buffer. Both are
    /// fatal to the session. A rejected batch is not an error.
    pub fn step(&mut self) -> Result<StepOutcome, SessionError> {
        if !self.started {
            self.started = true;
            self.emit(SessionEvent::Connected {
                serial: self.serial.clone(),
                transport: self.connection.transport(),
            });
            if let SessionState::AwaitingTrigger(orientation) = self.state {
                self.announce_trigger_wait(orientation);
            }
        }

        match self.state {
            SessionState::AwaitingTrigger(orientation) => self.step_awaiting(orientation),
            SessionState::Collecting(orientation) => self.step_collecting(orientation),
            SessionState::Evaluating(orientation) => self.step_evaluating(orientation),
            SessionState::Done => Ok(StepOutcome::Done),
        }
    }

    /// Drive the session to completion and hand the record to `sink`
    ///
    /// Blocks the calling thread; every wait is operator paced with no
    /// timeout. On any error nothing is persisted.
    pub fn run<S: CalibrationSink + ?Sized>(
        mut self,
        sink: &mut S,
    ) -> Result<FinalizedRecord, SessionError> {
        loop {
            match self.step()? {
                StepOutcome::Idle => thread::sleep(self.poll_interval),
                StepOutcome::Advanced => {}
                StepOutcome::Done => break,
            }
        }

        let record = self.finalize()?;
        sink.persist(&record)
            .inspect_err(|err| log_calibration_error(err, "persist"))?;
        Ok(record)
    }

    /// Consume the session and release its record
    ///
    /// # Errors
    /// * `CalibrationError::NotComplete` - the session has not reached `Done`
    pub fn finalize(self) -> Result<FinalizedRecord, SessionError> {
        if self.state != SessionState::Done {
            let err = CalibrationError::NotComplete {
                accepted: self.record.accepted(),
                required: Orientation::ALL.len(),
            };
            log_calibration_error(&err, "finalize");
            return Err(err.into());
        }
        Ok(self.record.finalize()?)
    }

    fn step_awaiting(&mut self, orientation: Orientation) -> Result<StepOutcome, SessionError> {
        if !self.poll()? {
            return Ok(StepOutcome::Idle);
        }

        if !self.trigger.observe(self.connection.trigger_pressed()) {
            return Ok(StepOutcome::Idle);
        }

        self.slot.begin_attempt();
        self.state = SessionState::Collecting(orientation);
        tracing::debug!(
            "[CalibrationSession] Trigger pressed, collecting {} readings for '{}' (attempt {})",
            self.samples_per_position,
            orientation.label(),
            self.slot.attempts()
        );
        Ok(StepOutcome::Advanced)
    }

    fn step_collecting(&mut self, orientation: Orientation) -> Result<StepOutcome, SessionError> {
        if !self.poll()? {
            return Ok(StepOutcome::Idle);
        }

        let reading = SensorReading::from_raw(
            self.connection.accelerometer(),
            self.connection.magnetometer(),
        );
        let appended = self.slot.buffer_mut().append(reading);
        debug_assert!(appended.is_ok(), "append past capacity while collecting");
        appended.inspect_err(|err| log_calibration_error(err, "collect"))?;

        let collected = self.slot.buffer().len();
        self.emit(SessionEvent::ReadingCollected {
            orientation,
            collected,
            needed: self.samples_per_position,
        });

        if self.slot.buffer().is_full() {
            self.state = SessionState::Evaluating(orientation);
        }
        Ok(StepOutcome::Advanced)
    }

    fn step_evaluating(&mut self, orientation: Orientation) -> Result<StepOutcome, SessionError> {
        debug_assert!(
            self.slot.buffer().is_full(),
            "evaluating a partially filled buffer"
        );
        let statistics = StatisticsEngine::compute(self.slot.buffer())
            .inspect_err(|err| log_calibration_error(err, "evaluate"))?;
        self.slot.set_statistics(statistics);

        match self.gate.evaluate(&statistics) {
            Ok(deviation_magnitude) => {
                log::info!(
                    "[CalibrationSession] Accepted '{}' (deviation {:.2}, attempt {})",
                    orientation.label(),
                    deviation_magnitude,
                    self.slot.attempts()
                );
                self.emit(SessionEvent::BatchEvaluated {
                    orientation,
                    statistics,
                    deviation_magnitude,
                    accepted: true,
                });
                self.record.commit(PositionEntry {
                    orientation,
                    statistics,
                    deviation_magnitude,
                });
                self.emit(SessionEvent::PositionAccepted {
                    orientation,
                    attempts: self.slot.attempts(),
                });

                match orientation.next() {
                    Some(next) => {
                        self.slot = OrientationSlot::new(next, self.samples_per_position);
                        self.enter_awaiting(next);
                    }
                    None => {
                        self.state = SessionState::Done;
                        log::info!(
                            "[CalibrationSession] All {} positions accepted for {}",
                            self.record.accepted(),
                            self.serial
                        );
                        self.emit(SessionEvent::Completed {
                            serial: self.serial.clone(),
                        });
                    }
                }
            }
            Err(CalibrationError::DeviationTooHigh {
                magnitude,
                threshold,
            }) => {
                log::warn!(
                    "[CalibrationSession] Deviation too high for '{}': {:.2} > {:.2}, retrying",
                    orientation.label(),
                    magnitude,
                    threshold
                );
                self.emit(SessionEvent::BatchEvaluated {
                    orientation,
                    statistics,
                    deviation_magnitude: magnitude,
                    accepted: false,
                });
                self.emit(SessionEvent::RetryRequested {
                    orientation,
                    deviation_magnitude: magnitude,
                    threshold,
                });
                self.enter_awaiting(orientation);
            }
            Err(other) => return Err(other.into()),
        }

        if self.state == SessionState::Done {
            Ok(StepOutcome::Done)
        } else {
            Ok(StepOutcome::Advanced)
        }
    }

    fn enter_awaiting(&mut self, orientation: Orientation) {
        self.trigger = TriggerEdge::new();
        self.state = SessionState::AwaitingTrigger(orientation);
        self.announce_trigger_wait(orientation);
    }

    fn announce_trigger_wait(&mut self, orientation: Orientation) {
        let attempt = self.slot.attempts() + 1;
        self.emit(SessionEvent::AwaitingTrigger {
            orientation,
            attempt,
        });
    }

    fn poll(&mut self) -> Result<bool, SessionError> {
        Ok(self
            .connection
            .poll()
            .inspect_err(|err| log_device_error(err, "poll"))?)
    }

    fn emit(&mut self, event: SessionEvent) {
        self.observer.on_event(&event);
    }
}

#[cfg(test)]
#[path = "procedure_tests.rs"]
mod tests;
