//! Value ranges mapping real-world values to and from `[0, 1]`.
//!
//! A [`ParamRange`] has a start, an end, an optional step, and a
//! [`RangeLaw`] that shapes the curve between them. The biased law puts more
//! of the normalized travel near one end; it is how a gain knob gets `0 dB`
//! at twelve o'clock while spanning `-12..12`, or a grain-size knob gets fine
//! resolution at short grains.

/// Smallest distance a bias may keep from `0` and `1`.
///
/// The biased curve degenerates to a step function at the extremes.
pub const BIAS_EPS: f32 = 1e-6;

/// Bias-weighted interpolation between `start` and `end`.
///
/// `bias` in `(0, 1)` bends the curve: `0.5` is linear, values toward `1`
/// rise quickly and flatten, values toward `0` start flat. `bias` is clamped
/// to `[BIAS_EPS, 1 - BIAS_EPS]` and `x` to `[0, 1]`, so the result always
/// lies between `start` and `end` and is monotone in `x`.
///
/// # Example
///
/// ```rust
/// use grainshift_params::biased;
///
/// assert_eq!(biased(0.0, 1.0, 0.5, 0.25), 0.25);
/// assert!(biased(0.0, 1.0, 0.9, 0.25) > 0.25);
/// assert_eq!(biased(0.0, 1.0, 0.9, 1.0), 1.0);
/// ```
pub fn biased(start: f32, end: f32, bias: f32, x: f32) -> f32 {
    let r = end - start;
    if r == 0.0 {
        return start;
    }
    let b = bias.clamp(BIAS_EPS, 1.0 - BIAS_EPS);
    let x = x.clamp(0.0, 1.0);
    // (1 - b) - x + 2bx, factored so x = 1 divides b by itself exactly
    let denom = (1.0 - b) * (1.0 - x) + b * x;
    start + r * (b * x / denom)
}

/// Curve between the range endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeLaw {
    /// Straight line.
    Linear,
    /// Biased curve; `bias` in `[-1, 1]`, `0` is linear.
    Biased {
        /// Signed bias. Positive values give more travel to the low end.
        bias: f32,
    },
}

/// Mapping between a real-world interval and the normalized `[0, 1]`.
///
/// # Example
///
/// ```rust
/// use grainshift_params::ParamRange;
///
/// let gain = ParamRange::with_centre(-12.0, 12.0, 0.0);
/// assert!(gain.convert_from_0to1(0.5).abs() < 1e-4);
///
/// let semis = ParamRange::stepped(-24.0, 24.0, 1.0);
/// assert_eq!(semis.snap_to_legal_value(3.4), 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    start: f32,
    end: f32,
    step: f32,
    law: RangeLaw,
}

impl ParamRange {
    /// Continuous straight-line range.
    pub fn linear(start: f32, end: f32) -> Self {
        Self {
            start,
            end,
            step: 0.0,
            law: RangeLaw::Linear,
        }
    }

    /// Continuous range with a signed bias in `[-1, 1]`.
    pub fn biased(start: f32, end: f32, bias: f32) -> Self {
        Self {
            start,
            end,
            step: 0.0,
            law: RangeLaw::Biased {
                bias: bias.clamp(-1.0, 1.0),
            },
        }
    }

    /// Biased range whose normalized midpoint lands on `centre`.
    ///
    /// The biased curve at `x = 0.5` evaluates to `start + r * (bias + 1) / 2`,
    /// so the bias that hits `centre` follows directly.
    pub fn with_centre(start: f32, end: f32, centre: f32) -> Self {
        let r = end - start;
        let bias = if r == 0.0 {
            0.0
        } else {
            2.0 * (centre - start) / r - 1.0
        };
        Self::biased(start, end, bias)
    }

    /// Linear range quantized to multiples of `step` from `start`.
    pub fn stepped(start: f32, end: f32, step: f32) -> Self {
        Self {
            start,
            end,
            step: step.max(0.0),
            law: RangeLaw::Linear,
        }
    }

    /// On/off range: `0..1` in steps of `1`.
    pub fn toggle() -> Self {
        Self::stepped(0.0, 1.0, 1.0)
    }

    /// Lower bound.
    pub fn start(&self) -> f32 {
        self.start
    }

    /// Upper bound.
    pub fn end(&self) -> f32 {
        self.end
    }

    /// Step size; `0` when continuous.
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Curve law.
    pub fn law(&self) -> RangeLaw {
        self.law
    }

    /// Clamp a real-world value into the range. NaN maps to `start`.
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.start).min(self.end)
    }

    /// Map a real-world value to `[0, 1]`.
    pub fn convert_to_0to1(&self, value: f32) -> f32 {
        let r = self.end - self.start;
        if r == 0.0 {
            return 0.0;
        }
        let v = self.clamp(value);
        let x = match self.law {
            RangeLaw::Linear => (v - self.start) / r,
            RangeLaw::Biased { bias } => {
                let a = bias_to_weight(bias);
                let denom = 2.0 * a * self.start + r * a - 2.0 * a * v - self.start + v;
                if denom == 0.0 {
                    return 0.0;
                }
                (1.0 - a) * (v - self.start) / denom
            }
        };
        x.clamp(0.0, 1.0)
    }

    /// Map a normalized value in `[0, 1]` to the real-world range.
    ///
    /// Not snapped; pair with [`snap_to_legal_value`](Self::snap_to_legal_value)
    /// where a step applies.
    pub fn convert_from_0to1(&self, normalized: f32) -> f32 {
        let x = normalized.clamp(0.0, 1.0);
        let v = match self.law {
            RangeLaw::Linear => self.start + (self.end - self.start) * x,
            RangeLaw::Biased { bias } => biased(self.start, self.end, bias_to_weight(bias), x),
        };
        self.clamp(v)
    }

    /// Round to the nearest step (if any) and clamp.
    pub fn snap_to_legal_value(&self, value: f32) -> f32 {
        if self.step <= 0.0 {
            return self.clamp(value);
        }
        let steps = ((value - self.start) / self.step).round();
        self.clamp(self.start + steps * self.step)
    }
}

/// Signed `[-1, 1]` bias to the `[0, 1]` weight used by [`biased`].
fn bias_to_weight(bias: f32) -> f32 {
    bias * 0.5 + 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn biased_primitive_endpoints() {
        for bias in [0.01, 0.3, 0.5, 0.7, 0.99] {
            assert_eq!(biased(-3.0, 5.0, bias, 0.0), -3.0);
            assert!(close(biased(-3.0, 5.0, bias, 1.0), 5.0));
        }
        assert_eq!(biased(2.0, 2.0, 0.7, 0.4), 2.0);
    }

    #[test]
    fn biased_primitive_survives_extreme_bias() {
        for bias in [0.0, 1.0, -5.0, 5.0] {
            for i in 0..=10 {
                let y = biased(0.0, 1.0, bias, i as f32 / 10.0);
                assert!(y.is_finite());
                assert!((0.0..=1.0).contains(&y));
            }
        }
    }

    #[test]
    fn linear_mapping() {
        let r = ParamRange::linear(-1.0, 1.0);
        assert_eq!(r.convert_from_0to1(0.5), 0.0);
        assert_eq!(r.convert_to_0to1(0.5), 0.75);
        assert_eq!(r.convert_to_0to1(7.0), 1.0);
        assert_eq!(r.convert_from_0to1(-1.0), -1.0);
    }

    #[test]
    fn with_centre_hits_centre() {
        for (start, end, centre) in [(-12.0, 12.0, 0.0), (10.0, 1000.0, 70.0), (0.0, 1.0, 0.19)] {
            let r = ParamRange::with_centre(start, end, centre);
            assert!(close(r.convert_from_0to1(0.5), centre), "{start}..{end}");
            assert!(close(r.convert_to_0to1(centre), 0.5));
        }
    }

    #[test]
    fn biased_round_trip() {
        let r = ParamRange::with_centre(10.0, 1000.0, 70.0);
        for i in 0..=20 {
            let x = i as f32 / 20.0;
            let back = r.convert_to_0to1(r.convert_from_0to1(x));
            assert!((back - x).abs() < 1e-3, "{x} -> {back}");
        }
    }

    #[test]
    fn stepped_snaps_from_start() {
        let r = ParamRange::stepped(1.0, 7.0, 1.0);
        assert_eq!(r.snap_to_legal_value(3.49), 3.0);
        assert_eq!(r.snap_to_legal_value(3.51), 4.0);
        assert_eq!(r.snap_to_legal_value(42.0), 7.0);
        let odd = ParamRange::stepped(0.5, 2.5, 1.0);
        assert_eq!(odd.snap_to_legal_value(1.4), 1.5);
    }

    #[test]
    fn toggle_range() {
        let t = ParamRange::toggle();
        assert_eq!(t.start(), 0.0);
        assert_eq!(t.end(), 1.0);
        assert_eq!(t.snap_to_legal_value(0.6), 1.0);
        assert_eq!(t.convert_to_0to1(1.0), 1.0);
    }

    #[test]
    fn degenerate_range_is_total() {
        let r = ParamRange::with_centre(3.0, 3.0, 3.0);
        assert_eq!(r.convert_to_0to1(3.0), 0.0);
        assert_eq!(r.convert_from_0to1(0.7), 3.0);
    }
}
