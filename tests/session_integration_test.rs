//! Integration tests for the calibration session through the public API
//!
//! Sessions are driven by recorded replay scripts from `fixtures/` and by the
//! synthetic controller, and persisted into in-memory or file sinks.

use std::path::PathBuf;

use motion_calibrator::calibration::{SessionEvent, SessionState, StepOutcome};
use motion_calibrator::device::{
    AttachedBackend, ReplayController, ReplayScript, SyntheticConfig, SyntheticController,
    Transport,
};
use motion_calibrator::storage::{CalibrationSink, FileStore};
use motion_calibrator::{
    AppConfig, CalibrationError, CalibrationSession, DeviceError, FinalizedRecord, Orientation,
    SessionError,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn config(samples: usize) -> AppConfig {
    let mut config = AppConfig::default();
    config.calibration.samples_per_position = samples;
    config.calibration.poll_interval_ms = 0;
    config
}

fn replay(name: &str) -> ReplayController {
    let script = ReplayScript::load(fixture(name)).expect("fixture script");
    ReplayController::new(script)
}

#[test]
fn test_replay_fixture_runs_to_completion() {
    let mut backend = AttachedBackend::new(replay("replay_complete.json"));
    let mut sink: Vec<FinalizedRecord> = Vec::new();

    let record = CalibrationSession::open(&mut backend, &config(4))
        .expect("open session")
        .run(&mut sink)
        .expect("calibration completes");

    assert_eq!(record.serial(), "00:06:f7:c9:a1:fb");
    assert_eq!(sink.len(), 1);
    assert_eq!(sink[0], record);

    let means = record.accelerometer_means();
    assert_eq!(means[0], [0.0, 4096.0, 0.0]);
    assert_eq!(means[1], [0.0, -4096.0, 0.0]);
    assert_eq!(means[5], [-4096.0, 0.0, 0.0]);
    for (entry, orientation) in record.entries().iter().zip(Orientation::ALL) {
        assert_eq!(entry.orientation, orientation);
        assert_eq!(entry.deviation_magnitude, 0.0);
    }
}

#[test]
fn test_replay_retry_reports_rejected_batch() {
    let controller = replay("replay_with_retry.json");
    let tracker = controller.tracker();
    let mut backend = AttachedBackend::new(controller);
    let mut events: Vec<SessionEvent> = Vec::new();
    let mut sink: Vec<FinalizedRecord> = Vec::new();

    let record = CalibrationSession::open(&mut backend, &config(4))
        .expect("open session")
        .with_observer(&mut events)
        .run(&mut sink)
        .expect("calibration completes");

    let retries: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::RetryRequested {
                orientation,
                deviation_magnitude,
                threshold,
            } => Some((*orientation, *deviation_magnitude, *threshold)),
            _ => None,
        })
        .collect();
    assert_eq!(retries.len(), 1);
    assert_eq!(retries[0].0, Orientation::BulbUp);
    assert!((retries[0].1 - 150.0).abs() < 1e-9);
    assert_eq!(retries[0].2, 100.0);

    // the retried batch replaces the rejected one
    assert_eq!(record.entries()[0].accelerometer_mean(), [0.0, 4096.0, 0.0]);
    assert!(matches!(events.last(), Some(SessionEvent::Completed { .. })));
    assert_eq!(tracker.disconnects(), 1);
}

#[test]
fn test_truncated_replay_persists_nothing() {
    let controller = replay("replay_truncated.json");
    let tracker = controller.tracker();
    let mut backend = AttachedBackend::new(controller);
    let mut sink: Vec<FinalizedRecord> = Vec::new();

    let result = CalibrationSession::open(&mut backend, &config(4))
        .expect("open session")
        .run(&mut sink);

    assert!(matches!(
        result,
        Err(SessionError::Device(DeviceError::Disconnected))
    ));
    assert!(sink.is_empty());
    assert_eq!(tracker.disconnects(), 1);
}

#[test]
fn test_usb_replay_is_rejected() {
    let controller = replay("replay_usb.json");
    let tracker = controller.tracker();
    let mut backend = AttachedBackend::new(controller);

    let result = CalibrationSession::open(&mut backend, &config(4));

    let err = match result {
        Err(err) => err,
        Ok(_) => panic!("Expected WrongTransport"),
    };
    assert!(
        err.to_string()
            .contains("Please connect the controller via Bluetooth."),
        "unexpected message: {err}"
    );
    assert_eq!(tracker.disconnects(), 1);
    assert_eq!(tracker.polls(), 0);
}

#[test]
fn test_usb_accepted_when_configured() {
    let mut config = config(4);
    config.device.required_transport = Transport::Usb;
    let mut backend = AttachedBackend::new(replay("replay_usb.json"));
    let mut sink: Vec<FinalizedRecord> = Vec::new();

    let record = CalibrationSession::open(&mut backend, &config)
        .expect("open session")
        .run(&mut sink)
        .expect("calibration completes");
    assert_eq!(record.serial(), "00:06:f7:c9:a1:fd");
}

#[test]
fn test_synthetic_session_with_shaking_completes() {
    let samples = 40;
    let controller = SyntheticController::new(SyntheticConfig {
        seed: 7,
        shake_probability: 0.4,
        samples_per_position: samples,
        stale_every: 5,
        ..SyntheticConfig::default()
    });
    let mut backend = AttachedBackend::new(controller);
    let mut events: Vec<SessionEvent> = Vec::new();
    let mut sink: Vec<FinalizedRecord> = Vec::new();

    let record = CalibrationSession::open(&mut backend, &config(samples))
        .expect("open session")
        .with_observer(&mut events)
        .run(&mut sink)
        .expect("calibration completes");

    for (entry, orientation) in record.entries().iter().zip(Orientation::ALL) {
        assert_eq!(entry.orientation, orientation);
        assert!(entry.deviation_magnitude <= 100.0);
    }

    // bulb up holds gravity on +y
    let [ax, ay, az] = record.entries()[0].accelerometer_mean();
    assert!(ax.abs() < 20.0 && az.abs() < 20.0);
    assert!((ay - 4096.0).abs() < 20.0);

    let accepted = events
        .iter()
        .filter(|event| matches!(event, SessionEvent::PositionAccepted { .. }))
        .count();
    assert_eq!(accepted, 6);
}

#[test]
fn test_manual_stepping_reaches_done() {
    let samples = 8;
    let controller = SyntheticController::new(SyntheticConfig {
        samples_per_position: samples,
        ..SyntheticConfig::default()
    });
    let mut backend = AttachedBackend::new(controller);
    let mut session = CalibrationSession::open(&mut backend, &config(samples)).expect("open");

    let mut steps = 0;
    while session.step().expect("step") != StepOutcome::Done {
        steps += 1;
        assert!(steps < 10_000, "session did not finish");
    }
    assert_eq!(session.state(), SessionState::Done);
    assert!(session.progress().is_calibration_complete());

    let record = session.finalize().expect("finalize");
    assert_eq!(record.entries().len(), 6);
}

#[test]
fn test_file_store_writes_calibration_file() {
    let dir = std::env::temp_dir()
        .join(format!("motion-calibrator-session-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");

    let mut backend = AttachedBackend::new(replay("replay_complete.json"));
    let mut store = FileStore::new(&dir);
    CalibrationSession::open(&mut backend, &config(4))
        .expect("open session")
        .run(&mut store)
        .expect("calibration completes");

    let path = dir.join("calibration.00-06-f7-c9-a1-fb.txt");
    assert_eq!(store.written(), Some(path.as_path()));
    let contents = std::fs::read_to_string(&path).expect("calibration file");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "0.000000 4096.000000 0.000000");
    assert_eq!(lines[3], "0.000000 0.000000 -4096.000000");

    let _ = std::fs::remove_dir_all(&dir);
}

struct FailingSink;

impl CalibrationSink for FailingSink {
    fn persist(&mut self, _record: &FinalizedRecord) -> Result<(), CalibrationError> {
        Err(CalibrationError::Persistence {
            reason: "read-only".to_string(),
        })
    }
}

#[test]
fn test_persistence_failure_is_reported() {
    let mut backend = AttachedBackend::new(replay("replay_complete.json"));
    let result = CalibrationSession::open(&mut backend, &config(4))
        .expect("open session")
        .run(&mut FailingSink);

    assert!(matches!(
        result,
        Err(SessionError::Calibration(CalibrationError::Persistence { .. }))
    ));
}
