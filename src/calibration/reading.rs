// SensorReading - six-channel accelerometer + magnetometer vector
//
// A reading is captured once from the controller and never mutated. The same
// shape is reused for the derived statistics (min, max, mean, deviation), so
// the arithmetic below is component-wise over all six channels.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Number of channels in a reading: ax, ay, az, mx, my, mz
pub const CHANNELS: usize = 6;

/// Channel names in storage order
pub const CHANNEL_NAMES: [&str; CHANNELS] = ["ax", "ay", "az", "mx", "my", "mz"];

/// One accelerometer + magnetometer sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReading([f64; CHANNELS]);

impl SensorReading {
    /// All channels zero
    pub const ZERO: SensorReading = SensorReading([0.0; CHANNELS]);

    pub fn new(ax: f64, ay: f64, az: f64, mx: f64, my: f64, mz: f64) -> Self {
        Self([ax, ay, az, mx, my, mz])
    }

    /// Build a reading from the integer counts reported by the controller
    pub fn from_raw(accel: [i32; 3], mag: [i32; 3]) -> Self {
        Self([
            f64::from(accel[0]),
            f64::from(accel[1]),
            f64::from(accel[2]),
            f64::from(mag[0]),
            f64::from(mag[1]),
            f64::from(mag[2]),
        ])
    }

    pub fn channels(&self) -> &[f64; CHANNELS] {
        &self.0
    }

    pub fn ax(&self) -> f64 {
        self.0[0]
    }

    pub fn ay(&self) -> f64 {
        self.0[1]
    }

    pub fn az(&self) -> f64 {
        self.0[2]
    }

    pub fn mx(&self) -> f64 {
        self.0[3]
    }

    pub fn my(&self) -> f64 {
        self.0[4]
    }

    pub fn mz(&self) -> f64 {
        self.0[5]
    }

    /// Accelerometer sub-vector (ax, ay, az)
    pub fn accelerometer(&self) -> [f64; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Magnetometer sub-vector (mx, my, mz)
    pub fn magnetometer(&self) -> [f64; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    /// Apply `f` to every channel
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self(self.0.map(f))
    }

    /// Combine two readings channel by channel
    pub fn zip_with(self, other: Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut out = [0.0; CHANNELS];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = f(self.0[i], other.0[i]);
        }
        Self(out)
    }

    /// Component-wise minimum; a channel is replaced only on a strict improvement
    pub fn component_min(self, other: Self) -> Self {
        self.zip_with(other, |a, b| if b < a { b } else { a })
    }

    /// Component-wise maximum; a channel is replaced only on a strict improvement
    pub fn component_max(self, other: Self) -> Self {
        self.zip_with(other, |a, b| if b > a { b } else { a })
    }
}

impl Add for SensorReading {
    type Output = SensorReading;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Sub for SensorReading {
    type Output = SensorReading;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Mul for SensorReading {
    type Output = SensorReading;

    fn mul(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a * b)
    }
}

impl Div<f64> for SensorReading {
    type Output = SensorReading;

    fn div(self, rhs: f64) -> Self::Output {
        self.map(|a| a / rhs)
    }
}
