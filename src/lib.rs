// src/lib.rs

//! # Two-Wheeled Balance Stabilization
//!
//! This module provides a `no_std`, no-alloc Rust implementation of the
//! real-time estimation-and-control core of a two-wheeled self-balancing
//! robot: quadrature position decoding, low-pass filtered wheel velocity
//! estimation, complementary-filter orientation estimation, a state-feedback
//! balance law, and per-motor PID velocity control, sequenced by a small
//! scheduler context.
//!
//! Hardware is reached only through trait seams (sensor bus, encoder pins,
//! actuator duty registers, telemetry link), so every algorithm in this
//! crate can be exercised on the host.

#![no_std]
#![deny(missing_docs)]

pub mod encoder;
pub mod imu;
pub mod pid;
pub mod scheduler;
pub mod stabilizer;

#[doc(inline)]
pub use pid::Number;
#[doc(inline)]
pub use scheduler::*;

#[cfg(test)]
mod test_utils;
