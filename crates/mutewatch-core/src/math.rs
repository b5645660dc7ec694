//! Level and time conversions used by the gate configuration.
//!
//! All functions are allocation-free and suitable for `no_std`.

use libm::{log10f, powf};

/// Convert decibels to a linear amplitude multiplier.
///
/// Uses `10^(dB/20)`. A non-finite input (e.g. `-inf` for "silence") maps to `0.0`
/// so a threshold built from it can never be crossed from below.
///
/// # Example
/// ```rust
/// use mutewatch_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
/// assert!((db_to_linear(-20.0) - 0.1).abs() < 1e-6);
/// assert_eq!(db_to_linear(f32::NEG_INFINITY), 0.0);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    if db.is_finite() {
        powf(10.0, db / 20.0)
    } else {
        0.0
    }
}

/// Convert a linear amplitude to decibels.
///
/// The input is floored at `1e-10` (-200 dB) so silence stays finite.
///
/// # Example
/// ```rust
/// use mutewatch_core::linear_to_db;
///
/// assert!((linear_to_db(0.1) + 20.0).abs() < 1e-4);
/// assert!(linear_to_db(0.0).is_finite());
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    20.0 * log10f(linear.max(1e-10))
}

/// Convert whole milliseconds to seconds.
#[inline]
pub fn ms_to_secs(ms: u32) -> f32 {
    ms as f32 / 1000.0
}
