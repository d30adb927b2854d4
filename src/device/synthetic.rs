// SyntheticController - simulated controller and operator
//
// Holds the six canonical poses with uniform sensor noise and plays the
// operator: release the trigger for a few reports, press and hold it long
// enough for one batch, then move to the next pose. A batch can randomly be
// "shaken" to exercise the retry path; a shaken pose is repeated.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::calibration::progress::{Orientation, POSITIONS};
use crate::device::{MotionController, Transport};
use crate::error::DeviceError;

/// Accelerometer counts for one g
pub const GRAVITY_COUNTS: i32 = 4096;

/// Largest noise amplitude the simulation accepts (counts)
pub const MAX_NOISE: i32 = 16 * GRAVITY_COUNTS;

/// Ambient magnetic field in controller frame for the bulb-up pose
const FIELD: [i32; 3] = [180, -320, 90];

/// Simulation parameters
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub serial: String,
    pub transport: Transport,
    pub seed: u64,
    /// Uniform noise amplitude on a steady hold (counts)
    pub noise: i32,
    /// Uniform noise amplitude on a shaken batch (counts)
    pub shake_noise: i32,
    /// Probability that a batch is shaken
    pub shake_probability: f64,
    /// Fresh reports with the trigger released before each press
    pub idle_reports: u32,
    /// Readings per batch the operator holds for
    pub samples_per_position: usize,
    /// Every Nth poll yields no fresh report (0 disables)
    pub stale_every: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            serial: "00:06:f7:00:00:01".to_string(),
            transport: Transport::Bluetooth,
            seed: 1,
            noise: 8,
            shake_noise: 600,
            shake_probability: 0.0,
            idle_reports: 3,
            samples_per_position: crate::calibration::buffer::DEFAULT_SAMPLES_PER_POSITION,
            stale_every: 0,
        }
    }
}

/// Gravity vector for a pose
fn accel_pose(orientation: Orientation) -> [i32; 3] {
    let g = GRAVITY_COUNTS;
    match orientation {
        Orientation::BulbUp => [0, g, 0],
        Orientation::BulbDown => [0, -g, 0],
        Orientation::ButtonsUp => [0, 0, g],
        Orientation::ButtonsDown => [0, 0, -g],
        Orientation::ButtonsLeft => [g, 0, 0],
        Orientation::ButtonsRight => [-g, 0, 0],
    }
}

/// Field vector for a pose, rotated the same way as gravity
fn mag_pose(orientation: Orientation) -> [i32; 3] {
    let [x, y, z] = FIELD;
    match orientation {
        Orientation::BulbUp => [x, y, z],
        Orientation::BulbDown => [x, -y, -z],
        Orientation::ButtonsUp => [x, -z, y],
        Orientation::ButtonsDown => [x, z, -y],
        Orientation::ButtonsLeft => [y, -x, z],
        Orientation::ButtonsRight => [-y, x, z],
    }
}

#[derive(Debug, Clone, Copy)]
enum OperatorPhase {
    Released { remaining: u32 },
    Holding { remaining: usize, shaken: bool },
}

pub struct SyntheticController {
    config: SyntheticConfig,
    rng: StdRng,
    phase: OperatorPhase,
    pose: usize,
    polls: u64,
    trigger: bool,
    accel: [i32; 3],
    mag: [i32; 3],
}

impl SyntheticController {
    pub fn new(mut config: SyntheticConfig) -> Self {
        config.shake_probability = if config.shake_probability.is_nan() {
            0.0
        } else {
            config.shake_probability.clamp(0.0, 1.0)
        };
        config.noise = config.noise.clamp(0, MAX_NOISE);
        config.shake_noise = config.shake_noise.clamp(0, MAX_NOISE);
        let rng = StdRng::seed_from_u64(config.seed);
        let phase = OperatorPhase::Released {
            remaining: config.idle_reports.max(1),
        };
        Self {
            config,
            rng,
            phase,
            pose: 0,
            polls: 0,
            trigger: false,
            accel: [0; 3],
            mag: [0; 3],
        }
    }

    /// Pose the simulated operator is currently holding
    pub fn current_pose(&self) -> Orientation {
        Orientation::ALL[self.pose % POSITIONS]
    }

    fn jitter(&mut self, base: [i32; 3], amplitude: i32) -> [i32; 3] {
        base.map(|v| v.saturating_add(self.rng.gen_range(-amplitude..=amplitude)))
    }

    fn advance_operator(&mut self) -> bool {
        match self.phase {
            OperatorPhase::Released { remaining } => {
                if remaining > 1 {
                    self.phase = OperatorPhase::Released {
                        remaining: remaining - 1,
                    };
                } else {
                    let shaken = self.rng.gen_bool(self.config.shake_probability);
                    // one report for the press edge, then one per reading
                    self.phase = OperatorPhase::Holding {
                        remaining: self.config.samples_per_position.saturating_add(1),
                        shaken,
                    };
                }
                false
            }
            OperatorPhase::Holding { remaining, shaken } => {
                if remaining > 1 {
                    self.phase = OperatorPhase::Holding {
                        remaining: remaining - 1,
                        shaken,
                    };
                } else {
                    if !shaken {
                        self.pose += 1;
                    }
                    self.phase = OperatorPhase::Released {
                        remaining: self.config.idle_reports.max(1),
                    };
                }
                true
            }
        }
    }
}

impl MotionController for SyntheticController {
    fn transport(&self) -> Transport {
        self.config.transport
    }

    fn serial(&self) -> String {
        self.config.serial.clone()
    }

    fn poll(&mut self) -> Result<bool, DeviceError> {
        self.polls += 1;
        let stale_every = u64::from(self.config.stale_every);
        if stale_every > 0 && self.polls % stale_every == 0 {
            return Ok(false);
        }

        let amplitude = match self.phase {
            OperatorPhase::Holding { shaken: true, .. } => self.config.shake_noise,
            _ => self.config.noise,
        };
        let pose = self.current_pose();
        self.accel = self.jitter(accel_pose(pose), amplitude);
        self.mag = self.jitter(mag_pose(pose), self.config.noise);
        self.trigger = self.advance_operator();
        Ok(true)
    }

    fn trigger_pressed(&self) -> bool {
        self.trigger
    }

    fn accelerometer(&self) -> [i32; 3] {
        self.accel
    }

    fn magnetometer(&self) -> [i32; 3] {
        self.mag
    }

    fn disconnect(&mut self) {
        log::info!(
            "[SyntheticController] Disconnecting {} after {} polls",
            self.config.serial,
            self.polls
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(samples: usize) -> SyntheticConfig {
        SyntheticConfig {
            samples_per_position: samples,
            idle_reports: 2,
            noise: 0,
            ..SyntheticConfig::default()
        }
    }

    #[test]
    fn test_operator_releases_then_holds_for_one_batch() {
        let mut controller = SyntheticController::new(config(3));
        let mut triggers = Vec::new();
        for _ in 0..(2 + 4) {
            assert_eq!(controller.poll(), Ok(true));
            triggers.push(controller.trigger_pressed());
        }
        assert_eq!(triggers, vec![false, false, true, true, true, true]);
        assert_eq!(controller.current_pose(), Orientation::BulbDown);
    }

    #[test]
    fn test_steady_pose_without_noise() {
        let mut controller = SyntheticController::new(config(3));
        controller.poll().unwrap();
        assert_eq!(controller.accelerometer(), [0, GRAVITY_COUNTS, 0]);
        assert_eq!(controller.magnetometer(), FIELD);
    }

    #[test]
    fn test_stale_every() {
        let mut controller = SyntheticController::new(SyntheticConfig {
            stale_every: 2,
            ..config(3)
        });
        assert_eq!(controller.poll(), Ok(true));
        assert_eq!(controller.poll(), Ok(false));
        assert_eq!(controller.poll(), Ok(true));
    }

    #[test]
    fn test_shaken_batch_repeats_pose() {
        let mut controller = SyntheticController::new(SyntheticConfig {
            shake_probability: 1.0,
            ..config(2)
        });
        for _ in 0..(2 + 3) {
            controller.poll().unwrap();
        }
        assert_eq!(controller.current_pose(), Orientation::BulbUp);
    }

    #[test]
    fn test_poses_are_unit_gravity() {
        for o in Orientation::ALL {
            let [x, y, z] = accel_pose(o);
            assert_eq!(x.abs() + y.abs() + z.abs(), GRAVITY_COUNTS);
        }
    }

    #[test]
    fn test_out_of_range_parameters_are_sanitized() {
        let mut controller = SyntheticController::new(SyntheticConfig {
            shake_probability: f64::NAN,
            noise: i32::MIN,
            shake_noise: i32::MAX,
            samples_per_position: usize::MAX,
            ..config(2)
        });
        assert_eq!(controller.config.shake_probability, 0.0);
        assert_eq!(controller.config.noise, 0);
        assert_eq!(controller.config.shake_noise, MAX_NOISE);

        for _ in 0..8 {
            assert_eq!(controller.poll(), Ok(true));
        }
        assert_eq!(controller.accelerometer(), accel_pose(Orientation::BulbUp));
    }
}
