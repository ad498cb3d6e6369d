// src/imu/orientation.rs

//! # Orientation Estimator Module
//!
//! Complementary-filter pitch estimation for the chassis.
//!
//! Two independent angle sources are blended each tick: trapezoidal
//! integration of the gyro rate (smooth but drifting) and accelerometer
//! leveling via `atan2` (absolute but noisy). A slow blend pulls the
//! integrated angle toward the accelerometer angle to bound long-term
//! drift, and a faster complementary blend produces the fused pitch the
//! balance controller consumes.
//!
//! A one-time stationary calibration averages a block of samples to find
//! the per-axis gyro bias and to seed the integrated angles from the
//! accelerometer.

use crate::imu::{ImuBus, ImuSample};
use libm::{atan2f, fabsf, sqrtf};

/// Radians-to-degrees conversion factor.
pub const RAD_TO_DEG: f32 = 57.2958;

/// Number of samples averaged during stationary calibration.
pub const CAL_CYCLES: usize = 200;

/// Slow blend weight holding the integrated gyro angle against drift.
const DRIFT_BLEND: f32 = 0.9996;

/// Fast complementary blend weight of the gyro angle in the fused pitch.
const FUSION_BLEND: f32 = 0.90;

/// Configuration for the orientation estimator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationConfig {
    /// Rate at which [`OrientationEstimator::update`] is called, in Hz.
    pub tick_rate_hz: f32,
    /// Rates below this magnitude (deg/s) are not integrated, suppressing
    /// bias accumulation from sensor noise while stationary. Zero disables
    /// the gate.
    pub gyro_threshold: f32,
}

impl OrientationConfig {
    /// Creates the reference configuration: 100 Hz updates with the
    /// integration gate disabled.
    pub fn new() -> Self {
        Self {
            tick_rate_hz: 100.0,
            gyro_threshold: 0.0,
        }
    }
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Fused chassis orientation estimator.
///
/// Angles are in degrees, rates in degrees per second. Axis indexing
/// follows the sensor frame: pitch is tracked about the x axis (index 0)
/// and roll about the z axis (index 2).
#[derive(Debug, Clone, Copy)]
pub struct OrientationEstimator {
    config: OrientationConfig,
    /// Gyro bias, written once by calibration.
    offset: [f32; 3],
    /// Latest bias-corrected angular rate.
    rate: [f32; 3],
    /// Rate from the previous tick, for trapezoidal integration.
    rate_prev: [f32; 3],
    /// Latest acceleration sample.
    accel: [f32; 3],
    /// Integrated (drift-corrected) gyro angles.
    gyro_angle: [f32; 3],
    /// Leveled accelerometer angles.
    accel_angle: [f32; 3],
    /// Fused pitch history, current and previous.
    fused: [f32; 2],
    /// Fused pitch rate.
    fused_rate: f32,
}

impl OrientationEstimator {
    /// Creates an estimator with zeroed state using the provided
    /// configuration.
    pub fn with_config(config: OrientationConfig) -> Self {
        Self {
            config,
            offset: [0.0; 3],
            rate: [0.0; 3],
            rate_prev: [0.0; 3],
            accel: [0.0; 3],
            gyro_angle: [0.0; 3],
            accel_angle: [0.0; 3],
            fused: [0.0; 2],
            fused_rate: 0.0,
        }
    }

    /// Creates an estimator with the reference configuration.
    pub fn new() -> Self {
        Self::with_config(OrientationConfig::new())
    }

    /// Performs the one-time stationary calibration.
    ///
    /// Averages [`CAL_CYCLES`] samples per axis; the average rate becomes
    /// the gyro offset subtracted from every subsequent read, and the
    /// average acceleration is leveled to seed the integrated pitch and
    /// roll angles. The vehicle must not move while this runs.
    pub fn calibrate<B: ImuBus>(&mut self, bus: &mut B) {
        let mut rate_sum = [0.0f32; 3];
        let mut accel_sum = [0.0f32; 3];
        for _ in 0..CAL_CYCLES {
            let sample = bus.sample();
            for axis in 0..3 {
                rate_sum[axis] += sample.gyro[axis];
                accel_sum[axis] += sample.accel[axis];
            }
        }

        let mut accel_avg = [0.0f32; 3];
        for axis in 0..3 {
            self.offset[axis] = rate_sum[axis] / CAL_CYCLES as f32;
            accel_avg[axis] = accel_sum[axis] / CAL_CYCLES as f32;
        }

        let (pitch, roll) = level(&accel_avg);
        self.gyro_angle[0] = pitch;
        self.gyro_angle[2] = roll;
    }

    /// Reads one sample and advances the orientation estimate.
    /// Call once per control tick.
    pub fn update<B: ImuBus>(&mut self, bus: &mut B) {
        let sample = bus.sample();
        self.ingest(sample);
    }

    /// Advances the estimate from an already-read sample.
    fn ingest(&mut self, sample: ImuSample) {
        let dt = 1.0 / self.config.tick_rate_hz;

        for axis in 0..3 {
            self.rate[axis] = sample.gyro[axis] - self.offset[axis];
            self.accel[axis] = sample.accel[axis];
        }

        // Trapezoidal gyro integration, gated by the rate dead-band.
        for axis in 0..3 {
            if fabsf(self.rate[axis]) >= self.config.gyro_threshold {
                self.gyro_angle[axis] += (self.rate[axis] + self.rate_prev[axis]) / 2.0 * dt;
            }
            self.rate_prev[axis] = self.rate[axis];
        }

        let (pitch, roll) = level(&self.accel);
        self.accel_angle[0] = pitch;
        self.accel_angle[2] = roll;

        // Slow accelerometer pull bounds the integrated angle's drift.
        self.gyro_angle[0] =
            DRIFT_BLEND * self.gyro_angle[0] + (1.0 - DRIFT_BLEND) * self.accel_angle[0];

        self.fused[1] = self.fused[0];
        self.fused[0] =
            FUSION_BLEND * self.gyro_angle[0] + (1.0 - FUSION_BLEND) * self.accel_angle[0];
        self.fused_rate = (self.fused[0] - self.fused[1]) * self.config.tick_rate_hz;
    }

    /// Fused chassis pitch in degrees.
    pub fn pitch(&self) -> f32 {
        self.fused[0]
    }

    /// Fused chassis pitch rate in degrees per second.
    pub fn pitch_rate(&self) -> f32 {
        self.fused_rate
    }

    /// Integrated, drift-corrected gyro pitch in degrees.
    pub fn gyro_pitch(&self) -> f32 {
        self.gyro_angle[0]
    }

    /// Leveled accelerometer pitch in degrees.
    pub fn accel_pitch(&self) -> f32 {
        self.accel_angle[0]
    }

    /// Latest bias-corrected angular rates in deg/s.
    pub fn rate(&self) -> [f32; 3] {
        self.rate
    }

    /// Gyro bias found by calibration, in deg/s.
    pub fn gyro_offset(&self) -> [f32; 3] {
        self.offset
    }
}

impl Default for OrientationEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Levels an acceleration vector into (pitch, roll) in degrees.
///
/// Pitch is measured about the x axis against the gravity direction; the
/// vertical axis in the mounting frame is y.
fn level(accel: &[f32; 3]) -> (f32, f32) {
    // The vertical component's sign picks the hemisphere; exactly zero
    // counts as positive so a fully horizontal chassis does not divide
    // zero by zero.
    let vertical_sign = if accel[1] < 0.0 { -1.0 } else { 1.0 };
    let horizontal = vertical_sign * sqrtf(accel[0] * accel[0] + accel[1] * accel[1]);
    let pitch = -atan2f(accel[2], horizontal) * RAD_TO_DEG;
    let roll = -atan2f(-accel[0], accel[1]) * RAD_TO_DEG;
    (pitch, roll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    /// Bus stub that replays a fixed sample forever.
    struct ConstantBus {
        sample: ImuSample,
    }

    impl ImuBus for ConstantBus {
        fn sample(&mut self) -> ImuSample {
            self.sample
        }
    }

    fn upright(gyro: [f32; 3]) -> ConstantBus {
        ConstantBus {
            sample: ImuSample {
                gyro,
                accel: [0.0, 1.0, 0.0],
            },
        }
    }

    /// Test the stationary calibration scenario: a constant 5 deg/s bias on
    /// one axis becomes the offset, and later reads report zero rate.
    #[test]
    fn test_orientation_calibration_offset() {
        let mut bus = upright([5.0, 0.0, 0.0]);
        let mut estimator = OrientationEstimator::new();
        estimator.calibrate(&mut bus);

        let offset = estimator.gyro_offset();
        assert!(value_close(5.0, offset[0]), "Offset should be 5 deg/s.");
        assert!(value_close(0.0, offset[1]));
        assert!(value_close(0.0, offset[2]));

        estimator.update(&mut bus);
        assert!(
            value_close(0.0, estimator.rate()[0]),
            "A raw read equal to the bias should report zero corrected rate."
        );
    }

    /// Test that calibration seeds the gyro angles from the accelerometer.
    #[test]
    fn test_orientation_calibration_seeds_angles() {
        // Tilted mounting: a z component shows up in the gravity vector.
        let mut bus = ConstantBus {
            sample: ImuSample {
                gyro: [0.0; 3],
                accel: [0.0, 0.8, 0.3],
            },
        };
        let mut estimator = OrientationEstimator::new();
        estimator.calibrate(&mut bus);

        let expected = -libm::atan2f(0.3, libm::sqrtf(0.64)) * RAD_TO_DEG;
        assert!(
            value_close_rel(expected, estimator.gyro_pitch()),
            "Gyro pitch should start at the leveled accelerometer pitch."
        );
    }

    /// Test that leveling stays finite when the vertical acceleration
    /// component is exactly zero.
    #[test]
    fn test_orientation_level_zero_vertical_component() {
        let mut calm = upright([0.0; 3]);
        let mut estimator = OrientationEstimator::new();
        estimator.calibrate(&mut calm);

        // Chassis pitched a full quarter turn: gravity entirely on z.
        let mut bus = ConstantBus {
            sample: ImuSample {
                gyro: [0.0; 3],
                accel: [0.0, 0.0, -1.0],
            },
        };
        estimator.update(&mut bus);
        assert!(
            (estimator.accel_pitch() - 90.0).abs() < 0.01,
            "Gravity fully on z should level to 90 degrees, got {}.",
            estimator.accel_pitch()
        );
        assert!(estimator.pitch().is_finite());
    }

    /// Test that a level, stationary estimator reports zero pitch.
    #[test]
    fn test_orientation_stationary_is_level() {
        let mut bus = upright([0.0; 3]);
        let mut estimator = OrientationEstimator::new();
        estimator.calibrate(&mut bus);
        for _ in 0..100 {
            estimator.update(&mut bus);
        }
        assert!(value_close(0.0, estimator.pitch()));
        assert!(value_close(0.0, estimator.pitch_rate()));
    }

    /// Test trapezoidal integration of a constant rate.
    #[test]
    fn test_orientation_gyro_integration() {
        let mut calm = upright([0.0; 3]);
        let mut estimator = OrientationEstimator::new();
        estimator.calibrate(&mut calm);

        // A constant 10 deg/s about x integrates to ~0.1 deg after two
        // 10 ms ticks: 0.05 (first tick averages against zero) + 0.1.
        let mut bus = upright([10.0, 0.0, 0.0]);
        estimator.update(&mut bus);
        assert!(
            (estimator.gyro_pitch() - 0.05).abs() < 1e-3,
            "First tick should integrate half the rate, got {}.",
            estimator.gyro_pitch()
        );
        estimator.update(&mut bus);
        assert!(
            (estimator.gyro_pitch() - 0.15).abs() < 1e-3,
            "Second tick should add the full step, got {}.",
            estimator.gyro_pitch()
        );
    }

    /// Test that rates below the dead-band threshold are not integrated.
    #[test]
    fn test_orientation_gyro_threshold_gate() {
        let mut estimator = OrientationEstimator::with_config(OrientationConfig {
            tick_rate_hz: 100.0,
            gyro_threshold: 20.0,
        });
        let mut calm = upright([0.0; 3]);
        estimator.calibrate(&mut calm);

        let mut bus = upright([10.0, 0.0, 0.0]);
        for _ in 0..50 {
            estimator.update(&mut bus);
        }
        assert!(
            value_close(0.0, estimator.gyro_pitch()),
            "Sub-threshold rates must not accumulate angle."
        );
    }

    /// Test that the fused pitch is a convex combination of its sources.
    #[test]
    fn test_orientation_fused_between_sources() {
        let mut calm = upright([0.0; 3]);
        let mut estimator = OrientationEstimator::new();
        estimator.calibrate(&mut calm);

        // A pitched-back gravity vector with a quiet gyro: the two angle
        // sources disagree, and the fused angle must sit between them.
        let mut bus = ConstantBus {
            sample: ImuSample {
                gyro: [0.0; 3],
                accel: [0.0, 0.9, -0.4],
            },
        };
        for _ in 0..20 {
            estimator.update(&mut bus);
            let low = estimator.gyro_pitch().min(estimator.accel_pitch());
            let high = estimator.gyro_pitch().max(estimator.accel_pitch());
            assert!(
                low <= estimator.pitch() && estimator.pitch() <= high,
                "Fused pitch {} escaped [{}, {}].",
                estimator.pitch(),
                low,
                high
            );
        }
    }

    /// Test that the fused rate is the scaled difference of fused pitches.
    #[test]
    fn test_orientation_fused_rate() {
        let mut calm = upright([0.0; 3]);
        let mut estimator = OrientationEstimator::new();
        estimator.calibrate(&mut calm);

        let mut bus = ConstantBus {
            sample: ImuSample {
                gyro: [0.0; 3],
                accel: [0.0, 0.9, -0.4],
            },
        };
        estimator.update(&mut bus);
        let first = estimator.pitch();
        estimator.update(&mut bus);
        let second = estimator.pitch();
        assert!(
            value_close((second - first) * 100.0, estimator.pitch_rate()),
            "Fused rate should be the tick-rate-scaled pitch difference."
        );
    }
}
