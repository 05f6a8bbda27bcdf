//! Fractional-index reads from sample buffers.
//!
//! | Function | Taps | Wraps | Use |
//! |----------|------|-------|-----|
//! | [`lerp_wrapped`] | 2 | yes | cheap fractional delay |
//! | [`cubic_hermite_wrapped`] | 4 | yes | grain playback from a ring |
//! | [`cubic_hermite`] | 4 | no | scratch buffers with guard samples |
//!
//! Every kernel returns the stored sample exactly when the index is an integer.

use libm::floorf;

/// Four-point cubic Hermite (Catmull-Rom) between `v1` and `v2` at `t` in `[0, 1)`.
///
/// ```text
/// c0 = v1
/// c1 = 0.5 (v2 - v0)
/// c2 = v0 - 2.5 v1 + 2 v2 - 0.5 v3
/// c3 = 1.5 (v1 - v2) + 0.5 (v3 - v0)
/// y  = ((c3 t + c2) t + c1) t + c0
/// ```
#[inline]
pub fn hermite(v0: f32, v1: f32, v2: f32, v3: f32, t: f32) -> f32 {
    let c0 = v1;
    let c1 = 0.5 * (v2 - v0);
    let c2 = v0 - 2.5 * v1 + 2.0 * v2 - 0.5 * v3;
    let c3 = 1.5 * (v1 - v2) + 0.5 * (v3 - v0);
    ((c3 * t + c2) * t + c1) * t + c0
}

#[inline]
fn split(index: f32) -> (isize, f32) {
    let whole = floorf(index);
    (whole as isize, index - whole)
}

#[inline]
fn tap(samples: &[f32], i: isize) -> f32 {
    samples[i.rem_euclid(samples.len() as isize) as usize]
}

/// Linear interpolation with wraparound at the buffer end.
///
/// Returns `0.0` for an empty buffer.
///
/// # Example
///
/// ```rust
/// use grainshift_core::lerp_wrapped;
///
/// let ring = [0.0, 1.0, 2.0, 3.0];
/// assert_eq!(lerp_wrapped(&ring, 1.5), 1.5);
/// assert_eq!(lerp_wrapped(&ring, 3.5), 1.5); // halfway back to ring[0]
/// ```
#[inline]
pub fn lerp_wrapped(samples: &[f32], index: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let (i, frac) = split(index);
    let a = tap(samples, i);
    let b = tap(samples, i + 1);
    a + frac * (b - a)
}

/// Cubic Hermite interpolation with all four taps wrapped into the buffer.
///
/// Returns `0.0` for an empty buffer.
#[inline]
pub fn cubic_hermite_wrapped(samples: &[f32], index: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let (i, frac) = split(index);
    hermite(
        tap(samples, i - 1),
        tap(samples, i),
        tap(samples, i + 1),
        tap(samples, i + 2),
        frac,
    )
}

/// Cubic Hermite interpolation without wraparound.
///
/// Intended for buffers that keep one guard sample before and two after the
/// readable region. Reads that would need a tap outside the buffer fall back to
/// [`cubic_hermite_wrapped`].
#[inline]
pub fn cubic_hermite(samples: &[f32], index: f32) -> f32 {
    let (i, frac) = split(index);
    if i < 1 || i as usize + 2 >= samples.len() {
        return cubic_hermite_wrapped(samples, index);
    }
    let i = i as usize;
    hermite(samples[i - 1], samples[i], samples[i + 1], samples[i + 2], frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RING: [f32; 6] = [0.3, -0.2, 0.9, 0.4, -0.7, 0.1];

    #[test]
    fn integer_indices_are_exact() {
        for (i, &v) in RING.iter().enumerate() {
            assert_eq!(lerp_wrapped(&RING, i as f32), v);
            assert_eq!(cubic_hermite_wrapped(&RING, i as f32), v);
            assert_eq!(cubic_hermite(&RING, i as f32), v);
        }
    }

    #[test]
    fn lerp_wraps_last_to_first() {
        let y = lerp_wrapped(&RING, 5.5);
        assert!((y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn hermite_reproduces_a_line() {
        let line: [f32; 8] = core::array::from_fn(|i| i as f32 * 0.5);
        for k in 0..40 {
            let x = 1.0 + k as f32 * 0.1;
            assert!((cubic_hermite(&line, x) - x * 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn negative_indices_wrap() {
        let y = cubic_hermite_wrapped(&RING, -1.0);
        assert_eq!(y, RING[5]);
    }

    #[test]
    fn empty_buffer_is_silent() {
        assert_eq!(lerp_wrapped(&[], 2.3), 0.0);
        assert_eq!(cubic_hermite_wrapped(&[], 2.3), 0.0);
        assert_eq!(cubic_hermite(&[], 2.3), 0.0);
    }
}
