// src/encoder/kinematics.rs

//! # Wheel Kinematics Module
//!
//! This module converts a wheel's quadrature position count into an angle,
//! differentiates it into a raw angular velocity, and smooths the velocity
//! with a fixed-order FIR low-pass filter.
//!
//! An FIR smoother is used instead of an integrating filter because its
//! group delay is bounded and known. The coefficient vector is symmetric
//! with approximately unity DC gain, and is reproduced bit-for-bit from the
//! tuning of the original mechanism; the balance gains were chosen against
//! its exact phase response.

/// Order of the velocity low-pass filter.
pub const LPF_ORDER: usize = 20;

/// FIR low-pass coefficients, calibrated against the original mechanism.
const LPF_COEFFS: [f32; LPF_ORDER + 1] = [
    -0.00081606,
    -0.00348667,
    -0.00846865,
    -0.01369406,
    -0.01349162,
    0.00002764,
    0.03264918,
    0.08284379,
    0.13937502,
    0.18445740,
    0.20170049,
    0.18445740,
    0.13937502,
    0.08284379,
    0.03264918,
    0.00002764,
    -0.01349162,
    -0.01369406,
    -0.00846865,
    -0.00348667,
    -0.00081606,
];

/// Configuration for wheel kinematics estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicsConfig {
    /// Wheel rotation per encoder count, in degrees.
    pub deg_per_count: f32,
    /// Rate at which [`WheelKinematics::update`] is called, in Hz.
    pub tick_rate_hz: f32,
}

impl KinematicsConfig {
    /// Creates the reference configuration: a 1400 count-per-revolution
    /// encoder sampled at the 100 Hz control rate.
    pub fn new() -> Self {
        Self {
            deg_per_count: 360.0 / 1400.0,
            tick_rate_hz: 100.0,
        }
    }
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-wheel angle and filtered angular velocity estimator.
///
/// Runs once per control tick on the latest position count. All angles are
/// in degrees and velocities in degrees per second.
#[derive(Debug, Clone, Copy)]
pub struct WheelKinematics {
    config: KinematicsConfig,
    /// Angle history, current and previous.
    angle: [f32; 2],
    /// Raw velocity history, newest first.
    velocity: [f32; LPF_ORDER + 1],
    velocity_filtered: f32,
}

impl WheelKinematics {
    /// Creates an estimator with zeroed state using the provided
    /// configuration.
    pub fn with_config(config: KinematicsConfig) -> Self {
        Self {
            config,
            angle: [0.0; 2],
            velocity: [0.0; LPF_ORDER + 1],
            velocity_filtered: 0.0,
        }
    }

    /// Creates an estimator with the reference configuration.
    pub fn new() -> Self {
        Self::with_config(KinematicsConfig::new())
    }

    /// Updates the angle and velocity estimates from the current position
    /// count. Call once per control tick.
    pub fn update(&mut self, count: i32) {
        self.angle[1] = self.angle[0];
        self.angle[0] = count as f32 * self.config.deg_per_count;

        for i in (1..=LPF_ORDER).rev() {
            self.velocity[i] = self.velocity[i - 1];
        }
        self.velocity[0] = (self.angle[0] - self.angle[1]) * self.config.tick_rate_hz;

        let mut filtered = 0.0;
        for (coeff, vel) in LPF_COEFFS.iter().zip(self.velocity.iter()) {
            filtered += coeff * vel;
        }
        self.velocity_filtered = filtered;
    }

    /// Current wheel angle in degrees.
    pub fn angle(&self) -> f32 {
        self.angle[0]
    }

    /// Latest unfiltered angular velocity in degrees per second.
    pub fn raw_velocity(&self) -> f32 {
        self.velocity[0]
    }

    /// Low-pass filtered angular velocity in degrees per second.
    pub fn filtered_velocity(&self) -> f32 {
        self.velocity_filtered
    }
}

impl Default for WheelKinematics {
    fn default() -> Self {
        Self::new()
    }
}
