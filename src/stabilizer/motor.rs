// src/stabilizer/motor.rs

//! # Motor Velocity Controller Module
//!
//! Per-motor PID velocity loop with anti-windup, static-friction deadzone
//! compensation, duty saturation, and a standstill dead-band, producing the
//! forward/backward PWM duty pair for one motor.
//!
//! The loop is built on the [`crate::pid::compute_velocity`] callback and
//! keeps its tuned sign convention: the PID output is computed from
//! measured-minus-setpoint error and negated into the duty command.

use crate::pid::{compute_velocity, VelocityControlData};
use libm::fabsf;
use piddiy::PidController;

/// Configuration for one motor velocity controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorConfig {
    /// Proportional gain.
    pub kp: f32,
    /// Integral gain.
    pub ki: f32,
    /// Derivative gain.
    pub kd: f32,
    /// Duty offset (percent) added to any nonzero command to overcome the
    /// motor's static friction and driver voltage threshold.
    pub deadzone: f32,
    /// Magnitude limit of the duty command, in percent.
    pub duty_limit: f32,
    /// Setpoint magnitudes below this (deg/s) force a zero command. The
    /// check is against the setpoint, not the measurement; a commanded
    /// stop must not chatter against the deadzone compensation.
    pub setpoint_deadband: f32,
    /// PWM timer period in counts; a 100% command writes this value.
    pub pwm_period: u16,
}

impl MotorConfig {
    /// Creates the reference tuning shared by both motors, with the right
    /// motor's deadzone. The left motor of the reference build uses
    /// a deadzone of 17.50.
    pub fn new() -> Self {
        Self {
            kp: 0.03,
            ki: 0.005,
            kd: 0.0,
            deadzone: 14.17,
            duty_limit: 100.0,
            setpoint_deadband: 1.0,
            pwm_period: 12000,
        }
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Duty command for one motor: one channel active, the other forced to
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorCommand {
    /// Forward channel duty, in PWM counts.
    pub forward: u16,
    /// Backward channel duty, in PWM counts.
    pub backward: u16,
}

/// PID velocity controller for a single motor.
pub struct MotorVelocityController {
    pid: PidController<f32, VelocityControlData<f32>>,
    config: MotorConfig,
}

impl MotorVelocityController {
    /// Creates a controller using the provided configuration.
    pub fn with_config(config: MotorConfig) -> Self {
        let mut pid = PidController::new();
        pid.compute_fn(compute_velocity)
            .set_point(0.0)
            .kp(config.kp)
            .ki(config.ki)
            .kd(config.kd);

        MotorVelocityController { pid, config }
    }

    /// Creates a controller with the reference tuning.
    pub fn new() -> Self {
        Self::with_config(MotorConfig::new())
    }

    /// Updates the velocity setpoint in degrees per second.
    pub fn set_velocity(&mut self, setpoint: f32) {
        self.pid.set_point(setpoint);
    }

    /// Current velocity setpoint in degrees per second.
    pub fn velocity_setpoint(&self) -> f32 {
        self.pid.set_point
    }

    /// Runs one PID step against the measured wheel velocity (deg/s,
    /// sign-corrected for mounting) and returns the duty command.
    pub fn update(&mut self, measured: f32) -> MotorCommand {
        let data = VelocityControlData {
            measured,
            // Anti-windup: keep the proportional-scaled integral inside the
            // duty range.
            integral_limit: self.config.duty_limit / self.config.kp,
        };
        let mut u = -self.pid.compute(data);

        // Deadzone compensation: jump past the actuator's stiction band.
        if u > 0.0 {
            u += self.config.deadzone;
        } else if u < 0.0 {
            u -= self.config.deadzone;
        }

        u = u.clamp(-self.config.duty_limit, self.config.duty_limit);

        // Standstill dead-band on the setpoint.
        if fabsf(self.pid.set_point) < self.config.setpoint_deadband {
            u = 0.0;
        }

        let duty = (self.config.pwm_period as f32 * (u / 100.0)) as i32;
        if duty >= 0 {
            MotorCommand {
                forward: duty as u16,
                backward: 0,
            }
        } else {
            MotorCommand {
                forward: 0,
                backward: -duty as u16,
            }
        }
    }

    /// Accumulated integral error, exposed for telemetry and tests.
    pub fn integral(&self) -> f32 {
        self.pid.integral
    }
}

impl Default for MotorVelocityController {
    fn default() -> Self {
        Self::new()
    }
}
