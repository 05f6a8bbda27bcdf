//! 2x block oversampler with integer latency.
//!
//! The pitch shifter reads its grain buffer at fractional positions; running it
//! at twice the host rate pushes the interpolation images above the audible
//! band.
//!
//! ## Signal Path
//!
//! ```text
//! x ─► zero-stuff (x2 gain) ─► half-band FIR ─► [effect at 2·fs] ─► half-band FIR ─► keep even ─► y
//! ```
//!
//! Both filters are the same 15-tap linear-phase half-band, so each delays by
//! 7 oversampled samples. The round trip is 14 oversampled samples, which is
//! exactly 7 host samples. An integer latency is what lets the dry/wet mixer
//! align the dry signal without fractional delay.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::{ChannelBuffer, MAX_CHANNELS};

/// Rate multiplier while enabled.
pub const OVERSAMPLING_FACTOR: usize = 2;

const TAPS: usize = 15;

/// Round-trip latency in host samples while enabled.
pub const LATENCY: usize = (TAPS - 1) / OVERSAMPLING_FACTOR;

/// Half-band lowpass at a quarter of the oversampled rate.
///
/// Odd taps away from the centre are zero. Coefficient sum is 1.0 for unity DC
/// gain.
#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static HALF_BAND: [f32; TAPS] = [
    -0.00152541,  0.00000000,  0.01309369,  0.00000000,
    -0.05738920,  0.00000000,  0.29581875,  0.50000434,
     0.29581875,  0.00000000, -0.05738920,  0.00000000,
     0.01309369,  0.00000000, -0.00152541,
];

#[derive(Debug, Clone)]
struct HalfBandFir {
    history: [f32; TAPS],
    pos: usize,
}

impl HalfBandFir {
    fn new() -> Self {
        Self {
            history: [0.0; TAPS],
            pos: 0,
        }
    }

    fn reset(&mut self) {
        self.history = [0.0; TAPS];
        self.pos = 0;
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.history[self.pos] = input;
        let mut acc = 0.0;
        let mut idx = self.pos;
        for &h in &HALF_BAND {
            acc += h * self.history[idx];
            idx = if idx == 0 { TAPS - 1 } else { idx - 1 };
        }
        self.pos = if self.pos + 1 == TAPS { 0 } else { self.pos + 1 };
        acc
    }
}

/// Block oversampler owning the high-rate buffer.
///
/// Disabled, it is an identity with zero latency and the "high-rate" buffer is
/// just a copy at the host rate. Enabling or disabling takes effect at the
/// next [`prepare`](Self::prepare).
///
/// # Example
///
/// ```rust
/// use grainshift_core::{ChannelBuffer, Oversampler};
///
/// let mut ovs = Oversampler::new(true);
/// ovs.prepare(48000.0, 64);
/// assert_eq!(ovs.fs_up(), 96000.0);
/// assert_eq!(ovs.block_size_up(), 128);
/// assert_eq!(ovs.latency(), 7);
///
/// let mut buf = ChannelBuffer::new(2, 64);
/// buf.set_len(64);
/// let up = ovs.upsample(&buf);
/// assert_eq!(up.len(), 128);
/// ovs.downsample(&mut buf);
/// ```
#[derive(Debug, Clone)]
pub struct Oversampler {
    enabled: bool,
    prepared_enabled: bool,
    sample_rate: f32,
    block_size: usize,
    up: ChannelBuffer,
    up_filters: Vec<HalfBandFir>,
    down_filters: Vec<HalfBandFir>,
}

impl Oversampler {
    /// Create an oversampler; `enabled` applies from the first `prepare`.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            prepared_enabled: false,
            sample_rate: 44100.0,
            block_size: 0,
            up: ChannelBuffer::default(),
            up_filters: (0..MAX_CHANNELS).map(|_| HalfBandFir::new()).collect(),
            down_filters: (0..MAX_CHANNELS).map(|_| HalfBandFir::new()).collect(),
        }
    }

    /// Request oversampling on or off for the next `prepare`.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the current preparation oversamples.
    pub fn is_enabled(&self) -> bool {
        self.prepared_enabled
    }

    /// Allocate the high-rate buffer and clear filter state.
    pub fn prepare(&mut self, sample_rate: f32, block_size: usize) {
        self.prepared_enabled = self.enabled;
        self.sample_rate = sample_rate;
        self.block_size = block_size;
        self.up.resize(block_size * self.factor());
        for fir in self.up_filters.iter_mut().chain(self.down_filters.iter_mut()) {
            fir.reset();
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            enabled = self.prepared_enabled,
            sample_rate,
            block_size,
            "oversampler prepared"
        );
    }

    /// Rate multiplier of the current preparation.
    pub fn factor(&self) -> usize {
        if self.prepared_enabled { OVERSAMPLING_FACTOR } else { 1 }
    }

    /// Sample rate the wet effect runs at.
    pub fn fs_up(&self) -> f32 {
        self.sample_rate * self.factor() as f32
    }

    /// Largest block the wet effect will see.
    pub fn block_size_up(&self) -> usize {
        self.block_size * self.factor()
    }

    /// Added latency in host samples.
    pub fn latency(&self) -> usize {
        if self.prepared_enabled { LATENCY } else { 0 }
    }

    /// Fill the high-rate buffer from `input` and hand it out for processing.
    pub fn upsample(&mut self, input: &ChannelBuffer) -> &mut ChannelBuffer {
        if !self.prepared_enabled {
            self.up.copy_from(input);
            return &mut self.up;
        }

        self.up.set_num_channels(input.num_channels());
        let n = self.up.set_len(input.len() * OVERSAMPLING_FACTOR) / OVERSAMPLING_FACTOR;
        for ch in 0..input.num_channels() {
            let fir = &mut self.up_filters[ch];
            let up = self.up.channel_mut(ch);
            for (pair, &x) in up.chunks_exact_mut(OVERSAMPLING_FACTOR).zip(&input.channel(ch)[..n]) {
                pair[0] = fir.process(x * OVERSAMPLING_FACTOR as f32);
                pair[1] = fir.process(0.0);
            }
        }
        &mut self.up
    }

    /// Filter and decimate the high-rate buffer back into `output`.
    pub fn downsample(&mut self, output: &mut ChannelBuffer) {
        if !self.prepared_enabled {
            output.copy_from(&self.up);
            return;
        }

        output.set_num_channels(self.up.num_channels());
        output.set_len(self.up.len() / OVERSAMPLING_FACTOR);
        for ch in 0..self.up.num_channels() {
            let fir = &mut self.down_filters[ch];
            for (y, pair) in output
                .channel_mut(ch)
                .iter_mut()
                .zip(self.up.channel(ch).chunks_exact(OVERSAMPLING_FACTOR))
            {
                *y = fir.process(pair[0]);
                fir.process(pair[1]);
            }
        }
    }
}

impl Default for Oversampler {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    #[test]
    fn coefficients_sum_to_unity() {
        let sum: f32 = HALF_BAND.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn disabled_is_identity() {
        let mut ovs = Oversampler::new(false);
        ovs.prepare(48000.0, 8);
        assert_eq!(ovs.latency(), 0);
        let mut buf = ChannelBuffer::new(1, 8);
        buf.set_len(8);
        buf.channel_mut(0).copy_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let before = buf.clone();
        ovs.upsample(&buf);
        ovs.downsample(&mut buf);
        assert_eq!(buf.channel(0), before.channel(0));
    }

    #[test]
    fn enable_takes_effect_on_prepare() {
        let mut ovs = Oversampler::new(false);
        ovs.prepare(48000.0, 8);
        ovs.set_enabled(true);
        assert!(!ovs.is_enabled());
        ovs.prepare(48000.0, 8);
        assert!(ovs.is_enabled());
        assert_eq!(ovs.latency(), LATENCY);
    }

    #[test]
    fn round_trip_delays_a_sine_by_latency() {
        let mut ovs = Oversampler::new(true);
        ovs.prepare(48000.0, 256);
        let freq = 1000.0;
        let mut buf = ChannelBuffer::new(1, 256);
        let mut input = Vec::new();
        let mut output = Vec::new();
        for block in 0..8 {
            buf.set_len(256);
            for (i, x) in buf.channel_mut(0).iter_mut().enumerate() {
                let n = (block * 256 + i) as f32;
                *x = libm::sinf(2.0 * PI * freq * n / 48000.0);
            }
            input.extend_from_slice(buf.channel(0));
            ovs.upsample(&buf);
            ovs.downsample(&mut buf);
            output.extend_from_slice(buf.channel(0));
        }
        for n in 512..2048 {
            assert!(
                (output[n] - input[n - LATENCY]).abs() < 0.01,
                "sample {n}: {} vs {}",
                output[n],
                input[n - LATENCY]
            );
        }
    }

    #[test]
    fn dc_passes_at_unity() {
        let mut ovs = Oversampler::new(true);
        ovs.prepare(48000.0, 64);
        let mut buf = ChannelBuffer::new(2, 64);
        for _ in 0..4 {
            buf.set_len(64);
            buf.channel_mut(0).fill(0.5);
            buf.channel_mut(1).fill(-0.5);
            let up = ovs.upsample(&buf);
            assert_eq!(up.len(), 128);
            ovs.downsample(&mut buf);
        }
        assert!((buf.channel(0)[63] - 0.5).abs() < 1e-4);
        assert!((buf.channel(1)[63] + 0.5).abs() < 1e-4);
    }
}
