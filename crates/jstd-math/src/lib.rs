//! Deterministic numeric helpers for test metrics.

#![forbid(unsafe_code)]

/// Round a floating point value to `decimals` decimal places.
#[must_use]
pub fn round_f64(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Percentage of tests that neither errored nor failed, rounded to one
/// decimal place.
///
/// An empty run counts as fully successful (`100.0`). Error and failure
/// counts larger than `tests` clamp the result to `0.0`.
///
/// # Examples
///
/// ```
/// use jstd_math::success_density;
///
/// assert_eq!(success_density(0, 0, 0), 100.0);
/// assert_eq!(success_density(4, 1, 0), 75.0);
/// ```
#[must_use]
pub fn success_density(tests: u64, errors: u64, failures: u64) -> f64 {
    if tests == 0 {
        return 100.0;
    }
    let passed = tests.saturating_sub(errors.saturating_add(failures));
    round_f64(passed as f64 * 100.0 / tests as f64, 1)
}

/// Convert a duration in (fractional) seconds to whole milliseconds.
///
/// Negative, NaN and infinite inputs yield `0`.
#[must_use]
pub fn seconds_to_millis(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}
