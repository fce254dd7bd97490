//! Shared test utilities for the confidence-contour workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Approximate float assertions
//! - Deterministic sample ensemble generators
//! - Small hand-checked count grids
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, stratified_gaussian_ensemble};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(0.68, 0.70, 0.001);              // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of `(x, y)` pairs.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_coords_approx_eq;
///
/// assert_coords_approx_eq!((10.01, 19.98), (10.0, 20.0), 0.05);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

/// Assert that a value lies in an inclusive range.
///
/// ```ignore
/// use test_utils::assert_in_range;
///
/// assert_in_range!(0.68, 0.66..=0.70);
/// ```
#[macro_export]
macro_rules! assert_in_range {
    ($value:expr, $range:expr) => {{
        let value: f64 = $value as f64;
        let range: ::std::ops::RangeInclusive<f64> = $range;
        if !range.contains(&value) {
            panic!(
                "assertion failed: `{:?}` not in `{:?}..={:?}`",
                value,
                range.start(),
                range.end()
            );
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_rejects_nan() {
        assert_approx_eq!(f64::NAN, 1.0, 0.001);
    }

    #[test]
    fn test_assert_coords_approx_eq_passes() {
        assert_coords_approx_eq!((10.01, 19.98), (10.0, 20.0), 0.05);
    }

    #[test]
    fn test_assert_in_range() {
        assert_in_range!(0.68, 0.66..=0.70);
    }

    #[test]
    #[should_panic(expected = "not in")]
    fn test_assert_in_range_fails() {
        assert_in_range!(0.72, 0.66..=0.70);
    }
}
