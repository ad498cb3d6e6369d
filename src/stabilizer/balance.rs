// src/stabilizer/balance.rs

//! # Balance Controller Module
//!
//! Linear state-feedback balance law (LQR-style). The four gains were
//! computed offline against the linearized cart-pendulum model of the
//! vehicle and are fixed at runtime. The law produces a desired wheel
//! angular acceleration, which is integrated at the control rate into the
//! desired wheel velocity shared by both motors.
//!
//! No saturation is applied to the acceleration or the velocity command;
//! the original tuning ran without limits and the gains assume the full
//! authority.

use crate::imu::orientation::RAD_TO_DEG;

/// Degrees-to-radians conversion factor.
pub const DEG_TO_RAD: f32 = 0.0174533;

/// Configuration for the balance controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceConfig {
    /// State-feedback gain vector over
    /// {wheel angle, wheel rate, chassis pitch, chassis pitch rate}.
    pub gains: [f32; 4],
    /// Rate at which [`BalanceController::update`] is called, in Hz.
    pub tick_rate_hz: f32,
}

impl BalanceConfig {
    /// Creates the reference configuration with the offline-computed gains.
    pub fn new() -> Self {
        Self {
            gains: [-0.1000, -0.8716, -410.4197, -71.6509],
            tick_rate_hz: 100.0,
        }
    }
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Measured vehicle state consumed by the balance law, in degrees and
/// degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BalanceState {
    /// Wheel angle relative to the chassis.
    pub wheel_angle: f32,
    /// Filtered wheel angular velocity.
    pub wheel_rate: f32,
    /// Fused chassis pitch.
    pub pitch: f32,
    /// Fused chassis pitch rate.
    pub pitch_rate: f32,
}

/// State-feedback balance controller.
#[derive(Debug, Clone, Copy)]
pub struct BalanceController {
    config: BalanceConfig,
    velocity_desired: f32,
}

impl BalanceController {
    /// Creates a controller with the provided configuration and a zero
    /// velocity setpoint.
    pub fn with_config(config: BalanceConfig) -> Self {
        Self {
            config,
            velocity_desired: 0.0,
        }
    }

    /// Creates a controller with the reference configuration.
    pub fn new() -> Self {
        Self::with_config(BalanceConfig::new())
    }

    /// Runs the balance law for one tick and returns the updated desired
    /// wheel velocity in degrees per second.
    ///
    /// The state is converted to radians, the gain vector dotted against it
    /// with a negative sign to get the desired wheel angular acceleration,
    /// and the acceleration Euler-integrated into the persistent velocity
    /// setpoint.
    pub fn update(&mut self, state: BalanceState) -> f32 {
        let x = [
            state.wheel_angle * DEG_TO_RAD,
            state.wheel_rate * DEG_TO_RAD,
            state.pitch * DEG_TO_RAD,
            state.pitch_rate * DEG_TO_RAD,
        ];

        let mut accel = 0.0;
        for (gain, state) in self.config.gains.iter().zip(x) {
            accel -= gain * state;
        }

        self.velocity_desired += accel / self.config.tick_rate_hz * RAD_TO_DEG;
        self.velocity_desired
    }

    /// Current desired wheel velocity in degrees per second.
    pub fn desired_velocity(&self) -> f32 {
        self.velocity_desired
    }
}

impl Default for BalanceController {
    fn default() -> Self {
        Self::new()
    }
}
