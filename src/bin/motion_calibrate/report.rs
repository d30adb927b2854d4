//! Operator-facing rendering of session events.

use std::io::{self, Write};

use clap::ValueEnum;
use motion_calibrator::calibration::{SessionEvent, SessionObserver, Statistics};

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Prompts and statistics tables
    Text,
    /// One JSON event per line
    Json,
}

pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn print_text(&self, event: &SessionEvent) {
        match event {
            SessionEvent::Connected { serial, .. } => {
                println!("Serial number: {}", serial);
            }
            SessionEvent::AwaitingTrigger { orientation, .. } => {
                println!(
                    "Put the controller in the position '{}' and press the trigger button",
                    orientation.label()
                );
            }
            SessionEvent::ReadingCollected {
                orientation,
                collected,
                needed,
            } => {
                print!("\rTaking reading {}...", collected);
                let _ = io::stdout().flush();
                if collected == needed {
                    println!("\rAll readings done for {}.", orientation.label());
                }
            }
            SessionEvent::BatchEvaluated {
                orientation,
                statistics,
                ..
            } => {
                println!("{}:", orientation.label());
                print_statistics(statistics, self.verbose);
                println!();
            }
            SessionEvent::RetryRequested { .. } => {
                println!("\n\n  DEVIATION TOO HIGH - PLEASE RETRY\n\n");
            }
            SessionEvent::PositionAccepted { .. } => {}
            SessionEvent::Completed { serial } => {
                println!("All positions calibrated for {}.", serial);
            }
        }
    }
}

fn print_rows(prefix: char, rows: [(&str, [f64; 3]); 4]) {
    for (i, (name, [x, y, z])) in rows.iter().enumerate() {
        let lead = if i == 0 { prefix } else { ' ' };
        println!("{} ({}: {:5.0} | {:5.0} | {:5.0})", lead, name, x, y, z);
    }
}

fn print_statistics(stats: &Statistics, verbose: bool) {
    print_rows(
        'a',
        [
            ("min", stats.min.accelerometer()),
            ("max", stats.max.accelerometer()),
            ("avg", stats.mean.accelerometer()),
            ("dev", stats.stddev.accelerometer()),
        ],
    );
    if verbose {
        print_rows(
            'm',
            [
                ("min", stats.min.magnetometer()),
                ("max", stats.max.magnetometer()),
                ("avg", stats.mean.magnetometer()),
                ("dev", stats.stddev.magnetometer()),
            ],
        );
    }
}

impl SessionObserver for Reporter {
    fn on_event(&mut self, event: &SessionEvent) {
        match self.format {
            OutputFormat::Text => self.print_text(event),
            OutputFormat::Json => match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(err) => log::warn!("[Reporter] Failed to encode event: {}", err),
            },
        }
    }
}
