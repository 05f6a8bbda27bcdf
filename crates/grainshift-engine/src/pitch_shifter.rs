//! Granular pitch shifter.
//!
//! Each voice reads the recent input back through two taps whose delay is
//! driven by a [`Phasor`]. Sweeping the delay at `(1 - ratio)` samples per
//! sample makes the read position move at `ratio` times the write speed,
//! which transposes by `ratio`. When a tap's delay wraps it jumps by a whole
//! grain; the Hann windows hide the jump, and because the two taps sit half
//! a grain apart their windows sum to one.
//!
//! ```text
//!            ┌──────────────── grain buffer (ring) ────────────────┐
//! x + fb·y ─►│ write ─►                                            │
//!            └──▲───────────────────────▲──────────────────────────┘
//!               │ delay = p·grain       │ delay = (p+½)·grain
//!               └── sin²(πp) ──┐   ┌── sin²(π(p+½)) ──┘
//!                              Σ over voices / n ─► y
//! ```

use core::f32::consts::PI;

use grainshift_core::{
    ChannelBuffer, MAX_CHANNELS, Phasor, SmoothedValue, cubic_hermite_wrapped, flush_denormal,
    ms_to_samples, semitones_to_ratio,
};
use libm::{floorf, sinf};

use crate::{ShiftControls, WetEffect};

/// Shortest grain the shifter will run.
pub const MIN_GRAIN_MS: f32 = 1.0;

const GRAIN_SMOOTHING_MS: f32 = 50.0;
/// Unity feedback never decays.
const MAX_FEEDBACK: f32 = 0.99;
/// Guard samples so the Hermite taps of the longest delay stay behind the write head.
const GUARD: usize = 4;

/// Detune of voice `v` out of `n`, spread evenly over `[-spread, spread]`.
///
/// A single voice is never detuned.
#[inline]
pub fn voice_detune(v: usize, n: usize, spread: f32) -> f32 {
    if n < 2 {
        return 0.0;
    }
    spread * (2.0 * v as f32 / (n - 1) as f32 - 1.0)
}

#[inline]
fn window(phase: f32) -> f32 {
    let s = sinf(PI * phase);
    s * s
}

#[inline]
fn frac(x: f32) -> f32 {
    x - floorf(x)
}

/// Multi-voice granular pitch shifter.
///
/// # Example
///
/// ```rust
/// use grainshift_core::ChannelBuffer;
/// use grainshift_engine::{GranularPitchShifter, ShiftControls, WetEffect};
///
/// let mut shifter = GranularPitchShifter::new(1000.0, 7);
/// shifter.prepare(96000.0, 256);
///
/// let mut buffer = ChannelBuffer::new(2, 256);
/// buffer.set_len(256);
/// let controls = ShiftControls { tune: 12.0, voices: 3, spread: 0.2, ..ShiftControls::default() };
/// shifter.process(&mut buffer, &controls);
/// ```
#[derive(Debug, Clone)]
pub struct GranularPitchShifter {
    max_grain_ms: f32,
    max_voices: usize,
    sample_rate: f32,
    rings: [Vec<f32>; MAX_CHANNELS],
    write_pos: usize,
    voices: Vec<Phasor>,
    phases: Vec<f32>,
    rate_offsets: Vec<f32>,
    grain_ms: SmoothedValue,
    grain_primed: bool,
}

impl GranularPitchShifter {
    /// Create for grains up to `max_grain_ms` and up to `max_voices` voices.
    pub fn new(max_grain_ms: f32, max_voices: usize) -> Self {
        let max_voices = max_voices.max(1);
        Self {
            max_grain_ms: max_grain_ms.max(MIN_GRAIN_MS),
            max_voices,
            sample_rate: 44100.0,
            rings: Default::default(),
            write_pos: 0,
            voices: (0..max_voices).map(|_| Phasor::new(44100.0)).collect(),
            phases: vec![0.0; max_voices],
            rate_offsets: vec![0.0; max_voices],
            grain_ms: SmoothedValue::new(0.0),
            grain_primed: false,
        }
    }

    /// Longest grain in milliseconds.
    pub fn max_grain_ms(&self) -> f32 {
        self.max_grain_ms
    }

    /// Most voices that will run.
    pub fn max_voices(&self) -> usize {
        self.max_voices
    }

    /// Ring length per channel at the prepared rate.
    pub fn ring_len(&self) -> usize {
        self.rings[0].len()
    }

    /// Current smoothed grain length in milliseconds.
    pub fn grain_ms(&self) -> f32 {
        self.grain_ms.current()
    }

    fn reset_voices(&mut self) {
        let n = self.voices.len() as f32;
        for (v, phasor) in self.voices.iter_mut().enumerate() {
            phasor.set_sample_rate(self.sample_rate);
            phasor.set_increment(0.0);
            phasor.set_phase(v as f32 / n);
        }
    }
}

impl WetEffect for GranularPitchShifter {
    fn prepare(&mut self, sample_rate: f32, _max_block: usize) {
        self.sample_rate = sample_rate;
        let len = ms_to_samples(self.max_grain_ms, sample_rate) as usize + GUARD;
        for ring in &mut self.rings {
            ring.clear();
            ring.resize(len, 0.0);
        }
        self.grain_ms.prepare(GRAIN_SMOOTHING_MS, sample_rate);
        self.reset();
        tracing::debug!(
            sample_rate,
            ring_len = len,
            max_voices = self.max_voices,
            "pitch shifter prepared"
        );
    }

    fn process(&mut self, buffer: &mut ChannelBuffer, controls: &ShiftControls) {
        let ring_len = self.ring_len();
        if ring_len <= GUARD || buffer.is_empty() {
            return;
        }
        let n = controls.voices.clamp(1, self.max_voices);
        let norm = 1.0 / n as f32;
        let feedback = controls.feedback.clamp(0.0, MAX_FEEDBACK);
        let max_grain = (ring_len - GUARD) as f32;
        let target_ms = controls.grain_size_ms.clamp(MIN_GRAIN_MS, self.max_grain_ms);
        if !self.grain_primed {
            self.grain_ms.set_immediate(target_ms);
            self.grain_primed = true;
        }
        for (v, offset) in self.rate_offsets[..n].iter_mut().enumerate() {
            let ratio = semitones_to_ratio(controls.tune + voice_detune(v, n, controls.spread));
            *offset = 1.0 - ratio;
        }

        let channels = buffer.num_channels();
        for i in 0..buffer.len() {
            let grain = ms_to_samples(self.grain_ms.process(target_ms), self.sample_rate)
                .clamp(2.0, max_grain);
            for ((phasor, phase), &offset) in self.voices[..n]
                .iter_mut()
                .zip(self.phases.iter_mut())
                .zip(&self.rate_offsets)
            {
                phasor.set_increment(offset / grain);
                *phase = phasor.process();
            }

            let head = self.write_pos as f32;
            for ch in 0..channels {
                let ring = &mut self.rings[ch];
                let mut sum = 0.0;
                for &phase in &self.phases[..n] {
                    for p in [phase, frac(phase + 0.5)] {
                        sum += window(p) * cubic_hermite_wrapped(ring, head - p * grain);
                    }
                }
                let y = sum * norm;
                let x = &mut buffer.channel_mut(ch)[i];
                ring[self.write_pos] = *x + feedback * flush_denormal(y);
                *x = y;
            }
            self.write_pos += 1;
            if self.write_pos == ring_len {
                self.write_pos = 0;
            }
        }
    }

    fn reset(&mut self) {
        for ring in &mut self.rings {
            ring.fill(0.0);
        }
        self.write_pos = 0;
        self.phases.fill(0.0);
        self.grain_primed = false;
        self.reset_voices();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f32 = 48000.0;

    fn run(shifter: &mut GranularPitchShifter, input: &[f32], controls: &ShiftControls) -> Vec<f32> {
        let mut out = Vec::with_capacity(input.len());
        let mut buffer = ChannelBuffer::new(1, 256);
        for chunk in input.chunks(256) {
            buffer.set_len(chunk.len());
            buffer.channel_mut(0).copy_from_slice(chunk);
            shifter.process(&mut buffer, controls);
            out.extend_from_slice(buffer.channel(0));
        }
        out
    }

    fn unison(grain_size_ms: f32, feedback: f32) -> ShiftControls {
        ShiftControls {
            tune: 0.0,
            grain_size_ms,
            feedback,
            voices: 1,
            spread: 0.0,
        }
    }

    #[test]
    fn detune_is_symmetric() {
        assert_eq!(voice_detune(0, 1, 1.0), 0.0);
        let detunes: Vec<f32> = (0..3).map(|v| voice_detune(v, 3, 1.0)).collect();
        assert_eq!(detunes, vec![-1.0, 0.0, 1.0]);
        assert_eq!(voice_detune(0, 2, 0.5), -0.5);
        assert_eq!(voice_detune(1, 2, 0.5), 0.5);
    }

    #[test]
    fn windows_sum_to_one() {
        for i in 0..100 {
            let p = i as f32 / 100.0;
            assert!((window(p) + window(frac(p + 0.5)) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn ring_sized_for_max_grain() {
        let mut shifter = GranularPitchShifter::new(500.0, 4);
        shifter.prepare(FS, 64);
        assert_eq!(shifter.ring_len(), 24000 + GUARD);
    }

    #[test]
    fn unison_single_voice_is_half_grain_delay() {
        let mut shifter = GranularPitchShifter::new(100.0, 3);
        shifter.prepare(FS, 256);
        let input: Vec<f32> = (0..2048).map(|i| ((i * 7919) % 101) as f32 / 50.0 - 1.0).collect();
        // 10 ms at 48 kHz is 480 samples; the open tap sits half a grain back.
        let out = run(&mut shifter, &input, &unison(10.0, 0.0));
        for t in 240..2048 {
            assert!((out[t] - input[t - 240]).abs() < 1e-4, "sample {t}");
        }
        assert!(out[..240].iter().all(|&y| y.abs() < 1e-6));
    }

    #[test]
    fn feedback_repeats_at_grain_delay() {
        let mut shifter = GranularPitchShifter::new(100.0, 1);
        shifter.prepare(FS, 256);
        let mut input = vec![0.0; 1024];
        input[0] = 1.0;
        let out = run(&mut shifter, &input, &unison(10.0, 0.5));
        assert!((out[240] - 1.0).abs() < 1e-4);
        assert!((out[480] - 0.5).abs() < 1e-4);
        assert!((out[720] - 0.25).abs() < 1e-4);
    }

    #[test]
    fn octave_up_doubles_frequency() {
        let mut shifter = GranularPitchShifter::new(100.0, 1);
        shifter.prepare(FS, 256);
        // 200 Hz has a 240-sample period; half of a 50 ms grain is five periods,
        // so both taps read in phase.
        let input: Vec<f32> = (0..48000)
            .map(|i| sinf(2.0 * PI * 200.0 * i as f32 / FS))
            .collect();
        let controls = ShiftControls {
            tune: 12.0,
            grain_size_ms: 50.0,
            ..unison(50.0, 0.0)
        };
        let out = run(&mut shifter, &input, &controls);
        let tail = &out[24000..];
        let crossings = tail
            .windows(2)
            .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
            .count();
        // 400 Hz over half a second
        assert!((380..=420).contains(&crossings), "crossings {crossings}");
    }

    #[test]
    fn output_bounded_with_many_voices() {
        let mut shifter = GranularPitchShifter::new(1000.0, 7);
        shifter.prepare(96000.0, 256);
        let input: Vec<f32> = (0..20000)
            .map(|i| sinf(2.0 * PI * 330.0 * i as f32 / 96000.0))
            .collect();
        let controls = ShiftControls {
            tune: -7.0,
            grain_size_ms: 120.0,
            feedback: 0.9,
            voices: 7,
            spread: 0.3,
        };
        let out = run(&mut shifter, &input, &controls);
        assert!(out.iter().all(|y| y.is_finite() && y.abs() < 20.0));
        assert!(out.iter().any(|y| y.abs() > 0.1));
    }

    #[test]
    fn voices_clamped_to_max() {
        let mut shifter = GranularPitchShifter::new(100.0, 2);
        shifter.prepare(FS, 64);
        let controls = ShiftControls {
            voices: 9,
            ..ShiftControls::default()
        };
        let mut buffer = ChannelBuffer::new(2, 64);
        buffer.set_len(64);
        buffer.channel_mut(0).fill(0.5);
        shifter.process(&mut buffer, &controls);
        assert!(buffer.channel(1).iter().all(|y| y.is_finite()));
    }

    #[test]
    fn reset_clears_history() {
        let mut shifter = GranularPitchShifter::new(100.0, 1);
        shifter.prepare(FS, 256);
        let input = vec![1.0; 1024];
        run(&mut shifter, &input, &unison(10.0, 0.0));
        shifter.reset();
        let out = run(&mut shifter, &[0.0; 512], &unison(10.0, 0.0));
        assert!(out.iter().all(|&y| y == 0.0));
    }

    #[test]
    fn unprepared_is_noop() {
        let mut shifter = GranularPitchShifter::new(100.0, 1);
        let mut buffer = ChannelBuffer::new(1, 8);
        buffer.set_len(8);
        buffer.channel_mut(0).fill(0.3);
        shifter.process(&mut buffer, &ShiftControls::default());
        assert!(buffer.channel(0).iter().all(|&y| y == 0.3));
    }
}
