// src/pid/velocity.rs

//! # Velocity-Based PID Control Module
//!
//! This module provides a compute function and control data structure for
//! the motor velocity PID loops. The conventions here are tuned against the
//! original mechanism and must be preserved:
//!
//! - The error is `measured - set_point`, the opposite of the usual
//!   setpoint-minus-measurement convention. The fixed gains were chosen
//!   against this sign, and the controller output is negated downstream.
//! - The integral accumulates the raw error once per tick and the derivative
//!   is a plain first difference. The control period is constant, so neither
//!   term is scaled by `dt`.

use crate::Number;
use piddiy::PidController;

/// Control data for velocity PID stabilization callback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityControlData<T> {
    /// The measured wheel angular velocity, sign-corrected for mounting.
    pub measured: T,
    /// The maximum allowed value for the integral term, used to prevent
    /// integral windup. For a percent-duty output this is `100 / kp`.
    pub integral_limit: T,
}

/// Velocity PID stabilization compute callback.
pub fn compute_velocity<T: Number>(
    pid: &mut PidController<T, VelocityControlData<T>>,
    data: VelocityControlData<T>,
) -> (T, T, T) {
    let error = data.measured - pid.set_point;
    let integral = (pid.integral + error).clamp(-data.integral_limit, data.integral_limit);
    let derivative = error - pid.error;

    (error, integral, derivative)
}
