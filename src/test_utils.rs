// src/test_utils.rs

//! This module contains utilities for testing.

/// A constant defining the tolerance within which floating-point values
/// are considered close enough to be equal.
pub const TEST_TOLERANCE: f32 = 1e-5;

/// Checks if two floating point numbers are close enough to be considered
/// equal.
///
/// # Arguments
/// * `target` - The target value.
/// * `value` - The value to compare against the target.
///
/// # Returns
/// `true` if the absolute difference between `target` and `value` is less than
/// `TEST_TOLERANCE`, otherwise `false`.
pub fn value_close(target: f32, value: f32) -> bool {
    (target - value).abs() < TEST_TOLERANCE
}

/// A tolerance applied in proportion to the target magnitude, for values
/// large enough that single-precision rounding exceeds the absolute
/// tolerance.
pub const TEST_RELATIVE_TOLERANCE: f32 = 1e-4;

/// Checks if two floating point numbers are close enough to be considered
/// equal, scaling the allowance with the magnitude of the target.
///
/// # Arguments
/// * `target` - The target value.
/// * `value` - The value to compare against the target.
///
/// # Returns
/// `true` if the absolute difference between `target` and `value` is less
/// than `TEST_TOLERANCE` plus `TEST_RELATIVE_TOLERANCE` times the magnitude
/// of `target`, otherwise `false`.
pub fn value_close_rel(target: f32, value: f32) -> bool {
    (target - value).abs() < TEST_TOLERANCE + TEST_RELATIVE_TOLERANCE * target.abs()
}
