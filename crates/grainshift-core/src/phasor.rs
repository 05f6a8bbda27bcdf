//! Phase accumulator in `[0, 1)`.

/// Ramp oscillator whose phase lives in `[0, 1)`.
///
/// The increment may be negative; the phase then runs downward and wraps from
/// `0` to just below `1`. Either wrap is reported by [`tick`](Self::tick).
///
/// # Example
///
/// ```rust
/// use grainshift_core::Phasor;
///
/// let mut phasor = Phasor::new(4.0);
/// phasor.set_frequency_hz(1.0);
/// assert!(!phasor.tick());
/// assert!(!phasor.tick());
/// assert!(!phasor.tick());
/// assert!(phasor.tick()); // fourth step completes the cycle
/// ```
#[derive(Debug, Clone)]
pub struct Phasor {
    phase: f32,
    inc: f32,
    sample_rate: f32,
}

impl Phasor {
    /// Create a stopped phasor at phase `0`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            inc: 0.0,
            sample_rate,
        }
    }

    /// Change the sample rate. The increment is not rescaled.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// One cycle per `1 / hz` seconds.
    pub fn set_frequency_hz(&mut self, hz: f32) {
        self.inc = hz / self.sample_rate;
    }

    /// One cycle per `ms` milliseconds.
    pub fn set_period_ms(&mut self, ms: f32) {
        self.inc = 1000.0 / (self.sample_rate * ms);
    }

    /// One cycle per `secs` seconds.
    pub fn set_period_secs(&mut self, secs: f32) {
        self.inc = 1.0 / (self.sample_rate * secs);
    }

    /// One cycle per `samples` samples.
    pub fn set_period_samples(&mut self, samples: f32) {
        self.inc = 1.0 / samples;
    }

    /// Set the per-sample increment directly.
    pub fn set_increment(&mut self, inc: f32) {
        self.inc = if inc.is_finite() { inc } else { 0.0 };
    }

    /// Per-sample increment.
    pub fn increment(&self) -> f32 {
        self.inc
    }

    /// Current phase.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Jump to a phase; wrapped into `[0, 1)`.
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = wrap_unit(phase);
    }

    /// Step one sample. Returns `true` when the phase wrapped.
    #[inline]
    pub fn tick(&mut self) -> bool {
        self.phase += self.inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
            if self.phase >= 1.0 {
                self.phase = wrap_unit(self.phase);
            }
            true
        } else if self.phase < 0.0 {
            self.phase += 1.0;
            if !(0.0..1.0).contains(&self.phase) {
                self.phase = wrap_unit(self.phase);
            }
            true
        } else {
            false
        }
    }

    /// Step one sample and return the new phase.
    #[inline]
    pub fn process(&mut self) -> f32 {
        self.tick();
        self.phase
    }
}

#[inline]
fn wrap_unit(x: f32) -> f32 {
    let wrapped = x - libm::floorf(x);
    // x - floor(x) rounds to 1.0 for tiny negative x
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_stays_in_unit_interval() {
        let mut p = Phasor::new(48000.0);
        p.set_frequency_hz(997.0);
        for _ in 0..10_000 {
            let ph = p.process();
            assert!((0.0..1.0).contains(&ph));
        }
    }

    #[test]
    fn negative_increment_wraps_downward() {
        let mut p = Phasor::new(10.0);
        p.set_increment(-0.25);
        assert!(p.tick());
        assert!((p.phase() - 0.75).abs() < 1e-6);
        assert!(!p.tick());
        assert!((p.phase() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn period_setters_agree() {
        let mut a = Phasor::new(48000.0);
        let mut b = Phasor::new(48000.0);
        let mut c = Phasor::new(48000.0);
        a.set_period_ms(10.0);
        b.set_period_secs(0.01);
        c.set_frequency_hz(100.0);
        assert!((a.increment() - b.increment()).abs() < 1e-9);
        assert!((a.increment() - c.increment()).abs() < 1e-9);
    }

    #[test]
    fn set_phase_wraps() {
        let mut p = Phasor::new(1.0);
        p.set_phase(2.25);
        assert!((p.phase() - 0.25).abs() < 1e-6);
        p.set_phase(-0.25);
        assert!((p.phase() - 0.75).abs() < 1e-6);
    }
}
