// src/encoder.rs

//! # Wheel Encoder Module
//!
//! This module decodes quadrature sensor transitions into a signed position
//! count and turns that count into a smoothed wheel angular velocity.

pub mod quadrature;
pub use quadrature::*;
pub mod kinematics;
pub use kinematics::*;
