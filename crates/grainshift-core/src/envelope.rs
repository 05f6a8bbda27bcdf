//! Asymmetric rise/fall envelope follower.
//!
//! Runs at whatever rate it is fed. The meters clock it once per measurement
//! window, so its time constants are evaluated against the window rate rather
//! than the audio sample rate.

use libm::expf;

/// Envelope follower with separate rise and fall time constants.
///
/// # Example
///
/// ```rust
/// use grainshift_core::EnvelopeFollower;
///
/// // Clocked 30 times per second, instant rise, 42 ms fall.
/// let mut env = EnvelopeFollower::new(30.0, 0.01, 42.0);
/// assert_eq!(env.process(1.0), 1.0);
/// assert!(env.process(0.0) < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    rise_coeff: f32,
    fall_coeff: f32,
    rate_hz: f32,
    rise_ms: f32,
    fall_ms: f32,
}

impl EnvelopeFollower {
    /// Create a follower clocked at `rate_hz`.
    pub fn new(rate_hz: f32, rise_ms: f32, fall_ms: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            rise_coeff: 0.0,
            fall_coeff: 0.0,
            rate_hz,
            rise_ms,
            fall_ms,
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Change the clock rate and recompute coefficients.
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate_hz = rate_hz;
        self.recalculate_coefficients();
    }

    /// Change both time constants.
    pub fn set_times(&mut self, rise_ms: f32, fall_ms: f32) {
        self.rise_ms = rise_ms;
        self.fall_ms = fall_ms;
        self.recalculate_coefficients();
    }

    /// Feed one level and return the new envelope.
    #[inline]
    pub fn process(&mut self, level: f32) -> f32 {
        let coeff = if level > self.envelope {
            self.rise_coeff
        } else {
            self.fall_coeff
        };
        self.envelope = level + coeff * (self.envelope - level);
        self.envelope
    }

    /// Current envelope without feeding a new level.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Drop the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate_coefficients(&mut self) {
        self.rise_coeff = coefficient(self.rise_ms, self.rate_hz);
        self.fall_coeff = coefficient(self.fall_ms, self.rate_hz);
    }
}

// coeff = exp(-1 / (time_ms * rate / 1000)); very short times underflow to 0
fn coefficient(time_ms: f32, rate_hz: f32) -> f32 {
    let ticks = time_ms * rate_hz / 1000.0;
    if ticks > 0.0 { expf(-1.0 / ticks) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fall_is_slower_than_rise() {
        let mut env = EnvelopeFollower::new(1000.0, 1.0, 50.0);
        let after_rise = env.process(1.0);
        let after_fall = env.process(0.0);
        assert!(after_rise > 0.5);
        assert!(after_fall > 0.9 * after_rise);
    }

    #[test]
    fn meter_rates_give_instant_rise() {
        let mut env = EnvelopeFollower::new(30.0, 0.01, 42.0);
        assert_eq!(env.process(0.8), 0.8);
        let fallen = env.process(0.0);
        // exp(-1 / 1.26)
        assert!((fallen - 0.8 * 0.452).abs() < 0.01);
    }

    #[test]
    fn reset_clears() {
        let mut env = EnvelopeFollower::new(30.0, 0.01, 42.0);
        env.process(1.0);
        env.reset();
        assert_eq!(env.level(), 0.0);
    }
}
