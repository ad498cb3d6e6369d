// src/imu.rs

//! # Inertial Measurement Module
//!
//! This module estimates the chassis pitch angle and pitch rate by fusing
//! gyroscope integration with accelerometer leveling, and defines the
//! sensor-side configuration and bus seam.

/// One pre-scaled inertial sample.
///
/// The sensor bus collaborator applies the sensitivity scaling; angular
/// rates arrive in degrees per second and accelerations in g. Gyro bias
/// correction is this crate's job, not the bus's.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImuSample {
    /// Angular rate about the x, y, and z axes, in deg/s.
    pub gyro: [f32; 3],
    /// Acceleration along the x, y, and z axes, in g.
    pub accel: [f32; 3],
}

/// Interface to the inertial sensor bus.
///
/// Implementations perform one wire transaction per call and return the
/// sample with unit conversion already applied.
pub trait ImuBus {
    /// Reads one gyro/accelerometer sample.
    fn sample(&mut self) -> ImuSample;
}

pub mod config;
pub use config::*;
pub mod orientation;
pub use orientation::*;
