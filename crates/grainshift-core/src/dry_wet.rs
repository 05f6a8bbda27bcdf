//! Latency-compensated dry/wet mixing with gain staging.
//!
//! The wet path (oversampler plus effect) delays the signal by a fixed number
//! of samples. [`DryWetMix`] keeps a copy of the unprocessed input delayed by
//! exactly that amount, so dry and wet line up sample for sample when they are
//! recombined.
//!
//! ## Block sequence
//!
//! ```text
//! save_dry ──► (wet processing) ──► process_out_gain ──► process_mix
//!
//! process_bypass  (instead of all of the above)
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::sqrtf;

use crate::{ChannelBuffer, MAX_CHANNELS, SmoothedBlock, WriteHead, db_to_linear};

/// Curve pair used to crossfade dry and wet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixLaw {
    /// `dry = sqrt(1 - mix)`, `wet = sqrt(mix)`; constant power across the range.
    #[default]
    EqualPower,
    /// `dry = 1 - mix`, `wet = mix`.
    Linear,
}

impl MixLaw {
    /// Dry and wet coefficients for a mix amount in `[0, 1]`.
    #[inline]
    pub fn gains(self, mix: f32) -> (f32, f32) {
        let mix = mix.clamp(0.0, 1.0);
        match self {
            MixLaw::EqualPower => (sqrtf(1.0 - mix), sqrtf(mix)),
            MixLaw::Linear => (1.0 - mix, mix),
        }
    }
}

/// Control values read from the parameters once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixControls {
    /// Input gain in dB, or `None` when input staging is not part of the layout.
    pub gain_in_db: Option<f32>,
    /// Dry/wet amount in `[0, 1]`.
    pub mix: f32,
    /// Output gain in dB applied to the wet signal.
    pub gain_out_db: f32,
    /// Flip the sign of the wet signal.
    pub polarity_inverted: bool,
    /// Amount of input gain subtracted from output gain; only honoured together
    /// with `gain_in_db`.
    pub unity_gain: Option<f32>,
}

impl Default for MixControls {
    fn default() -> Self {
        Self {
            gain_in_db: None,
            mix: 1.0,
            gain_out_db: 0.0,
            polarity_inverted: false,
            unity_gain: None,
        }
    }
}

/// Per-channel delay that realigns the dry signal with the wet path.
///
/// Each sample is read from the ring before being overwritten, so the value
/// written at time `t` comes back out at exactly `t + latency`. With a latency
/// of `0` no ring is allocated and the input is copied straight through.
#[derive(Debug, Clone, Default)]
pub struct LatencyCompensation {
    rings: [Vec<f32>; MAX_CHANNELS],
    write_head: WriteHead,
    latency: usize,
}

impl LatencyCompensation {
    /// Create a zero-latency compensator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize the rings for `latency` samples and clear them.
    pub fn prepare(&mut self, block_size: usize, latency: usize) {
        self.latency = latency;
        for ring in &mut self.rings {
            ring.clear();
            if latency == 0 {
                ring.shrink_to_fit();
            } else {
                ring.resize(latency, 0.0);
            }
        }
        self.write_head.prepare(block_size, latency);
    }

    /// Current delay in samples.
    pub fn latency(&self) -> usize {
        self.latency
    }

    /// Write `input` into the rings and fill `dry` with the delayed signal.
    pub fn process(&mut self, input: &ChannelBuffer, dry: &mut ChannelBuffer) {
        dry.set_num_channels(input.num_channels());
        dry.set_len(input.len());

        if self.latency == 0 {
            dry.copy_from(input);
            return;
        }

        self.write_head.advance(input.len());
        let indices = self.write_head.indices();
        for ch in 0..input.num_channels() {
            let ring = &mut self.rings[ch];
            for ((out, &x), &w) in dry.channel_mut(ch).iter_mut().zip(input.channel(ch)).zip(indices) {
                *out = ring[w];
                ring[w] = x;
            }
        }
    }
}

/// Dry capture, gain staging and dry/wet recombination.
///
/// Mix, output gain and input gain are each smoothed into a per-sample curve.
/// Buffers are sized by [`prepare`](Self::prepare); nothing allocates per
/// block.
#[derive(Debug, Clone)]
pub struct DryWetMix {
    law: MixLaw,
    smoothing_ms: f32,
    compensation: LatencyCompensation,
    dry: ChannelBuffer,
    gain_in: SmoothedBlock,
    mix: SmoothedBlock,
    gain_out: SmoothedBlock,
    mix_dry: Vec<f32>,
    mix_wet: Vec<f32>,
    len: usize,
}

impl DryWetMix {
    /// Create a mixer with the given law and smoothing time for every curve.
    pub fn new(law: MixLaw, smoothing_ms: f32) -> Self {
        Self {
            law,
            smoothing_ms,
            compensation: LatencyCompensation::new(),
            dry: ChannelBuffer::default(),
            gain_in: SmoothedBlock::new(1.0),
            mix: SmoothedBlock::new(1.0),
            gain_out: SmoothedBlock::new(1.0),
            mix_dry: Vec::new(),
            mix_wet: Vec::new(),
            len: 0,
        }
    }

    /// Allocate for `block_size` samples and a wet-path latency of `latency`.
    pub fn prepare(&mut self, sample_rate: f32, block_size: usize, latency: usize) {
        self.compensation.prepare(block_size, latency);
        self.dry.resize(block_size);
        for curve in [&mut self.gain_in, &mut self.mix, &mut self.gain_out] {
            curve.prepare(sample_rate, block_size, self.smoothing_ms);
        }
        self.mix_dry.clear();
        self.mix_dry.resize(block_size, 0.0);
        self.mix_wet.clear();
        self.mix_wet.resize(block_size, 1.0);
        self.len = 0;

        #[cfg(feature = "tracing")]
        tracing::debug!(sample_rate, block_size, latency, "dry/wet mixer prepared");
    }

    /// Latency the dry path is delayed by.
    pub fn latency(&self) -> usize {
        self.compensation.latency()
    }

    /// Mix law in use.
    pub fn law(&self) -> MixLaw {
        self.law
    }

    /// The latency-aligned dry block captured by the last call.
    pub fn dry(&self) -> &ChannelBuffer {
        &self.dry
    }

    /// Capture the aligned dry signal, stage input gain in place and render the
    /// mix and output gain curves for this block.
    pub fn save_dry(&mut self, buffer: &mut ChannelBuffer, controls: &MixControls) {
        let n = buffer.len().min(self.mix_dry.len());
        buffer.set_len(n);
        self.compensation.process(buffer, &mut self.dry);

        let mut gain_out_db = controls.gain_out_db;
        if let Some(gain_in_db) = controls.gain_in_db {
            let curve = self.gain_in.process_block(db_to_linear(gain_in_db), n);
            for ch in 0..buffer.num_channels() {
                for (x, &g) in buffer.channel_mut(ch).iter_mut().zip(curve) {
                    *x *= g;
                }
            }
            if let Some(unity) = controls.unity_gain {
                gain_out_db -= gain_in_db * unity;
            }
        }

        let mut gain = db_to_linear(gain_out_db);
        if controls.polarity_inverted {
            gain = -gain;
        }
        self.gain_out.process_block(gain, n);

        let mix = self.mix.process_block(controls.mix.clamp(0.0, 1.0), n);
        for ((d, w), &m) in self.mix_dry.iter_mut().zip(self.mix_wet.iter_mut()).zip(mix) {
            (*d, *w) = self.law.gains(m);
        }
        self.len = n;
    }

    /// Multiply the wet signal by the output gain curve.
    pub fn process_out_gain(&self, buffer: &mut ChannelBuffer) {
        let gain = self.gain_out.last_block();
        for ch in 0..buffer.num_channels() {
            for (x, &g) in buffer.channel_mut(ch).iter_mut().zip(gain) {
                *x *= g;
            }
        }
    }

    /// Recombine: `out = dry * mix_dry + wet * mix_wet`.
    pub fn process_mix(&self, buffer: &mut ChannelBuffer) {
        let mix_dry = &self.mix_dry[..self.len];
        let mix_wet = &self.mix_wet[..self.len];
        for ch in 0..buffer.num_channels().min(self.dry.num_channels()) {
            let dry = self.dry.channel(ch);
            for (((x, &d), &md), &mw) in buffer
                .channel_mut(ch)
                .iter_mut()
                .zip(dry)
                .zip(mix_dry)
                .zip(mix_wet)
            {
                *x = d * md + *x * mw;
            }
        }
    }

    /// Replace the buffer with its latency-aligned dry copy.
    pub fn process_bypass(&mut self, buffer: &mut ChannelBuffer) {
        let n = buffer.len().min(self.dry.capacity());
        buffer.set_len(n);
        self.compensation.process(buffer, &mut self.dry);
        buffer.copy_from(&self.dry);
    }
}
