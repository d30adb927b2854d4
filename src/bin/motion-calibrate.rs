use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use motion_calibrator::calibration::CalibrationSession;
use motion_calibrator::config::AppConfig;
use motion_calibrator::device::{
    AttachedBackend, DeviceBackend, ReplayController, ReplayScript, SyntheticConfig,
    SyntheticController, Transport, MAX_NOISE,
};
use motion_calibrator::storage::FileStore;

#[path = "motion_calibrate/report.rs"]
mod report;
use report::{OutputFormat, Reporter};

fn main() -> ExitCode {
    let cli = Cli::parse();
    motion_calibrator::init_logging(cli.verbose);
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "motion-calibrate",
    about = "Six-position accelerometer calibration for motion controllers"
)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory the calibration file is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Readings collected per position
    #[arg(long)]
    samples: Option<usize>,
    /// Maximum accelerometer deviation magnitude before a retry
    #[arg(long)]
    max_deviation: Option<f64>,
    /// Append magnetometer means to the calibration file
    #[arg(long, default_value_t = false)]
    persist_magnetometer: bool,
    /// Event output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Debug logging and magnetometer statistics
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calibrate a simulated controller.
    Simulate(SimulateArgs),
    /// Calibrate from a recorded replay script.
    Replay {
        /// Path to the JSON replay script
        #[arg(long)]
        script: PathBuf,
    },
    /// Print the effective configuration as JSON.
    ShowConfig,
}

#[derive(clap::Args, Debug, Clone)]
struct SimulateArgs {
    /// Random seed for sensor noise and shaking
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Noise amplitude on a steady hold (raw counts)
    #[arg(
        long,
        default_value_t = 8,
        value_parser = clap::value_parser!(i32).range(0..=i64::from(MAX_NOISE))
    )]
    noise: i32,
    /// Probability that a batch is shaken and must be retried
    #[arg(long, default_value_t = 0.0, value_parser = parse_probability)]
    shake_probability: f64,
    /// Serial identity reported by the simulated controller
    #[arg(long, default_value = "00:06:f7:00:00:01")]
    serial: String,
    /// Transport reported by the simulated controller
    #[arg(long, value_enum, default_value_t = TransportArg::Bluetooth)]
    transport: TransportArg,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum TransportArg {
    Bluetooth,
    Usb,
}

fn parse_probability(value: &str) -> Result<f64, String> {
    let probability: f64 = value.parse().map_err(|err| format!("{err}"))?;
    if (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(format!("{value} is not a probability between 0 and 1"))
    }
}

impl From<TransportArg> for Transport {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Bluetooth => Transport::Bluetooth,
            TransportArg::Usb => Transport::Usb,
        }
    }
}

impl Cli {
    fn execute(self) -> Result<()> {
        let config = self.resolve_config();
        let reporter = Reporter::new(self.format, self.verbose);

        match self.command {
            Command::Simulate(args) => {
                let controller = SyntheticController::new(SyntheticConfig {
                    serial: args.serial,
                    transport: args.transport.into(),
                    seed: args.seed,
                    noise: args.noise,
                    shake_probability: args.shake_probability,
                    samples_per_position: config.calibration.samples_per_position,
                    ..SyntheticConfig::default()
                });
                calibrate(&mut AttachedBackend::new(controller), &config, reporter)
            }
            Command::Replay { script } => {
                let script = ReplayScript::load(&script)?;
                let controller = ReplayController::new(script);
                calibrate(&mut AttachedBackend::new(controller), &config, reporter)
            }
            Command::ShowConfig => {
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(())
            }
        }
    }

    fn resolve_config(&self) -> AppConfig {
        let mut config = self
            .config
            .as_ref()
            .map(AppConfig::load_from_file)
            .unwrap_or_default();

        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(samples) = self.samples {
            config.calibration.samples_per_position = samples;
        }
        if let Some(max_deviation) = self.max_deviation {
            config.calibration.max_deviation = max_deviation;
        }
        if self.persist_magnetometer {
            config.output.persist_magnetometer = true;
        }
        config
    }
}

fn calibrate<B: DeviceBackend>(
    backend: &mut B,
    config: &AppConfig,
    mut reporter: Reporter,
) -> Result<()> {
    let format = reporter.format();
    let session = CalibrationSession::open(backend, config)
        .context("opening calibration session")?
        .with_observer(&mut reporter);

    let mut store = FileStore::from_config(&config.output);
    let record = session.run(&mut store).context("calibration aborted")?;

    let path = store.path_for(record.serial());
    log::info!("Calibration for {} saved", record.serial());
    match format {
        OutputFormat::Text => println!("Calibration written to {}", path.display()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "type": "saved", "payload": { "path": path } })
        ),
    }
    Ok(())
}
