// src/stabilizer.rs

//! # Balance Stabilizer Module
//!
//! This module holds the two control layers of the vehicle: the
//! state-feedback balance law that turns the estimated state into a desired
//! wheel velocity, and the per-motor PID velocity controllers that turn
//! that setpoint into actuator duty commands.

pub mod balance;
pub use balance::*;
pub mod motor;
pub use motor::*;
