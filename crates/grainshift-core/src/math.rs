//! Level, time and stereo conversions used across the signal path.
//!
//! All functions are allocation-free and `no_std`.

use libm::{expf, exp2f, logf};

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use grainshift_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels. Inputs below `1e-10` are floored.
///
/// # Example
/// ```rust
/// use grainshift_core::linear_to_db;
///
/// assert!(linear_to_db(1.0).abs() < 0.001);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Playback-rate ratio for a transposition in semitones.
#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    exp2f(semitones / 12.0)
}

/// Convert milliseconds to samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Convert samples to milliseconds.
#[inline]
pub fn samples_to_ms(samples: f32, sample_rate: f32) -> f32 {
    samples * 1000.0 / sample_rate
}

/// Replace values below `1e-20` with zero.
///
/// Used in feedback paths where a signal can decay into the subnormal range.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Encode left/right into mid/side in place: `m = (l + r) / 2`, `s = (l - r) / 2`.
pub fn encode_mid_side(left: &mut [f32], right: &mut [f32]) {
    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        let mid = (*l + *r) * 0.5;
        let side = (*l - *r) * 0.5;
        *l = mid;
        *r = side;
    }
}

/// Decode mid/side back to left/right in place: `l = m + s`, `r = m - s`.
pub fn decode_mid_side(mid: &mut [f32], side: &mut [f32]) {
    for (m, s) in mid.iter_mut().zip(side.iter_mut()) {
        let left = *m + *s;
        let right = *m - *s;
        *m = left;
        *s = right;
    }
}
