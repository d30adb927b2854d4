// Calibration file persistence
//
// One line per orientation in canonical order, accelerometer mean printed
// with six decimals: `ax ay az`. With magnetometer persistence enabled the
// magnetometer mean is appended to each line.

use std::fs;
use std::path::{Path, PathBuf};

use crate::calibration::state::FinalizedRecord;
use crate::config::OutputConfig;
use crate::error::CalibrationError;

/// Receives the finalized record exactly once per completed session
pub trait CalibrationSink {
    fn persist(&mut self, record: &FinalizedRecord) -> Result<(), CalibrationError>;
}

/// Keeps finalized records in memory
impl CalibrationSink for Vec<FinalizedRecord> {
    fn persist(&mut self, record: &FinalizedRecord) -> Result<(), CalibrationError> {
        self.push(record.clone());
        Ok(())
    }
}

/// Replace characters that are unsafe in a file name with `-`
pub fn sanitize_serial(serial: &str) -> String {
    serial
        .chars()
        .map(|c| match c {
            ':' | '/' | '\\' => '-',
            other => other,
        })
        .collect()
}

/// File name for a controller's calibration
pub fn calibration_file_name(serial: &str) -> String {
    format!("calibration.{}.txt", sanitize_serial(serial))
}

/// Render the record in the calibration file format
pub fn format_record(record: &FinalizedRecord, include_magnetometer: bool) -> String {
    let mut out = String::new();
    for entry in record.entries() {
        let [ax, ay, az] = entry.accelerometer_mean();
        out.push_str(&format!("{:.6} {:.6} {:.6}", ax, ay, az));
        if include_magnetometer {
            let [mx, my, mz] = entry.magnetometer_mean();
            out.push_str(&format!(" {:.6} {:.6} {:.6}", mx, my, mz));
        }
        out.push('\n');
    }
    out
}

/// Writes `calibration.<serial>.txt` into a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
    include_magnetometer: bool,
    written: Option<PathBuf>,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            include_magnetometer: false,
            written: None,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.directory).with_magnetometer(config.persist_magnetometer)
    }

    pub fn with_magnetometer(mut self, include: bool) -> Self {
        self.include_magnetometer = include;
        self
    }

    pub fn path_for(&self, serial: &str) -> PathBuf {
        self.directory.join(calibration_file_name(serial))
    }

    /// Path of the last file written
    pub fn written(&self) -> Option<&Path> {
        self.written.as_deref()
    }
}

impl CalibrationSink for FileStore {
    fn persist(&mut self, record: &FinalizedRecord) -> Result<(), CalibrationError> {
        let path = self.path_for(record.serial());
        let contents = format_record(record, self.include_magnetometer);
        fs::write(&path, contents).map_err(|err| CalibrationError::Persistence {
            reason: format!("writing {}: {}", path.display(), err),
        })?;
        log::info!("[FileStore] Wrote calibration to {}", path.display());
        self.written = Some(path);
        Ok(())
    }
}
