//! Windowed level meters published to the UI through atomics.
//!
//! The audio thread accumulates peak or RMS energy over a window of
//! `sample_rate / refresh_rate_hz` samples. At every window boundary the
//! result is pushed through an [`EnvelopeFollower`] and stored into a
//! [`MeterLevels`] slot, which the UI thread reads whenever it likes.
//!
//! Window boundaries come from a shared [`WriteHead`]: the sample whose write
//! index is `0` closes the previous window before it is accumulated.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use core::sync::atomic::{AtomicU32, Ordering};

use libm::sqrtf;

use crate::{ChannelBuffer, EnvelopeFollower, WriteHead};

/// Meter rise time in milliseconds (effectively instant at meter rates).
pub const RISE_MS: f32 = 0.01;
/// Meter fall time in milliseconds.
pub const FALL_MS: f32 = 42.0;

/// What a window measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeterMode {
    /// Largest absolute sample in the window.
    #[default]
    Peak,
    /// Root mean square over the window.
    Rms,
}

/// Which meter slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterKind {
    /// Signal after input gain staging.
    Input,
    /// Wet signal after output gain, before the dry/wet mix.
    Output,
}

/// Published meter values, shared between audio and UI threads.
///
/// Each slot is an `f32` stored as its bit pattern in an [`AtomicU32`], so
/// reads are never torn.
#[derive(Debug, Default)]
pub struct MeterLevels {
    input: AtomicU32,
    output: AtomicU32,
}

impl MeterLevels {
    /// Latest published envelope for `kind`.
    pub fn level(&self, kind: MeterKind) -> f32 {
        f32::from_bits(self.slot(kind).load(Ordering::Acquire))
    }

    fn publish(&self, kind: MeterKind, value: f32) {
        self.slot(kind).store(value.to_bits(), Ordering::Release);
    }

    fn slot(&self, kind: MeterKind) -> &AtomicU32 {
        match kind {
            MeterKind::Input => &self.input,
            MeterKind::Output => &self.output,
        }
    }
}

#[derive(Debug, Clone)]
struct Accumulator {
    rect: f32,
    follower: EnvelopeFollower,
}

impl Accumulator {
    fn new(rate_hz: f32) -> Self {
        Self {
            rect: 0.0,
            follower: EnvelopeFollower::new(rate_hz, RISE_MS, FALL_MS),
        }
    }

    fn finish_window(&mut self, mode: MeterMode, len_inv: f32, stereo: bool) -> f32 {
        let value = match mode {
            MeterMode::Peak => self.rect,
            MeterMode::Rms => sqrtf(self.rect * len_inv),
        };
        let value = if stereo { value * 0.5 } else { value };
        self.rect = 0.0;
        self.follower.process(value)
    }

    #[inline]
    fn accumulate(&mut self, mode: MeterMode, sample: f32) {
        match mode {
            MeterMode::Peak => self.rect = self.rect.max(sample.abs()),
            MeterMode::Rms => self.rect += sample * sample,
        }
    }
}

/// Input and output meters sharing one window clock.
///
/// Call [`begin_block`](Self::begin_block) once per block, then observe the
/// input and/or output signal.
///
/// # Example
///
/// ```rust
/// use grainshift_core::{ChannelBuffer, MeterKind, MeterMode, Meters};
///
/// let mut meters = Meters::new(MeterMode::Peak, 30.0);
/// meters.prepare(48000.0, 1600);
/// let levels = meters.levels();
///
/// let mut buf = ChannelBuffer::new(1, 1600);
/// buf.set_len(1600);
/// buf.channel_mut(0).fill(0.5);
/// for _ in 0..2 {
///     meters.begin_block(1600);
///     meters.process(MeterKind::Output, &buf);
/// }
/// assert_eq!(levels.level(MeterKind::Output), 0.5);
/// ```
#[derive(Debug)]
pub struct Meters {
    mode: MeterMode,
    refresh_rate_hz: f32,
    write_head: WriteHead,
    window_len: usize,
    len_inv: f32,
    input: Accumulator,
    output: Accumulator,
    levels: Arc<MeterLevels>,
}

impl Meters {
    /// Create meters publishing `refresh_rate_hz` times per second.
    pub fn new(mode: MeterMode, refresh_rate_hz: f32) -> Self {
        let rate = if refresh_rate_hz > 0.0 { refresh_rate_hz } else { 30.0 };
        Self {
            mode,
            refresh_rate_hz: rate,
            write_head: WriteHead::new(),
            window_len: 1,
            len_inv: 1.0,
            input: Accumulator::new(rate),
            output: Accumulator::new(rate),
            levels: Arc::new(MeterLevels::default()),
        }
    }

    /// Size the window for a sample rate and the block clock for a block size.
    pub fn prepare(&mut self, sample_rate: f32, block_size: usize) {
        self.window_len = ((sample_rate / self.refresh_rate_hz) as usize).max(1);
        self.len_inv = 1.0 / self.window_len as f32;
        self.write_head.prepare(block_size, self.window_len);
        for acc in [&mut self.input, &mut self.output] {
            acc.follower.set_rate(self.refresh_rate_hz);
        }
    }

    /// Samples per measurement window.
    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Measurement mode.
    pub fn mode(&self) -> MeterMode {
        self.mode
    }

    /// Handle for the UI thread.
    pub fn levels(&self) -> Arc<MeterLevels> {
        Arc::clone(&self.levels)
    }

    /// Advance the window clock by one block.
    pub fn begin_block(&mut self, num_samples: usize) {
        self.write_head.advance(num_samples);
    }

    /// Observe a block for one meter slot.
    ///
    /// Stereo blocks are metered on the sum of both channels, halved when the
    /// window closes.
    pub fn process(&mut self, kind: MeterKind, buffer: &ChannelBuffer) {
        let indices = self.write_head.indices();
        let acc = match kind {
            MeterKind::Input => &mut self.input,
            MeterKind::Output => &mut self.output,
        };
        let stereo = buffer.num_channels() > 1;
        let n = indices.len().min(buffer.len());
        let left = &buffer.channel(0)[..n];
        let right = if stereo { Some(&buffer.channel(1)[..n]) } else { None };

        for (s, &w) in indices[..n].iter().enumerate() {
            if w == 0 {
                let env = acc.finish_window(self.mode, self.len_inv, stereo);
                self.levels.publish(kind, env);
            }
            let sample = match right {
                Some(r) => left[s] + r[s],
                None => left[s],
            };
            acc.accumulate(self.mode, sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(channels: usize, len: usize, value: f32) -> ChannelBuffer {
        let mut buf = ChannelBuffer::new(channels, len);
        buf.set_len(len);
        for ch in 0..channels {
            buf.channel_mut(ch).fill(value);
        }
        buf
    }

    #[test]
    fn publishes_only_at_window_boundary() {
        let mut meters = Meters::new(MeterMode::Peak, 100.0);
        meters.prepare(1000.0, 4);
        assert_eq!(meters.window_len(), 10);
        let levels = meters.levels();
        let buf = block(1, 4, 0.8);

        // First sample closes the (empty) startup window.
        meters.begin_block(4);
        meters.process(MeterKind::Output, &buf);
        assert_eq!(levels.level(MeterKind::Output), 0.0);
        meters.begin_block(4);
        meters.process(MeterKind::Output, &buf);
        assert_eq!(levels.level(MeterKind::Output), 0.0);
        // Samples 8..12 contain index 0 at sample 10.
        meters.begin_block(4);
        meters.process(MeterKind::Output, &buf);
        assert!((levels.level(MeterKind::Output) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn stereo_sum_is_halved() {
        let mut meters = Meters::new(MeterMode::Peak, 100.0);
        meters.prepare(1000.0, 20);
        let levels = meters.levels();
        let buf = block(2, 20, -0.3);
        meters.begin_block(20);
        meters.process(MeterKind::Input, &buf);
        assert!((levels.level(MeterKind::Input) - 0.3).abs() < 1e-6);
        assert_eq!(levels.level(MeterKind::Output), 0.0);
    }

    #[test]
    fn rms_of_constant_is_constant() {
        let mut meters = Meters::new(MeterMode::Rms, 50.0);
        meters.prepare(1000.0, 20);
        let levels = meters.levels();
        let buf = block(1, 20, 0.5);
        meters.begin_block(20);
        meters.process(MeterKind::Output, &buf);
        meters.begin_block(20);
        meters.process(MeterKind::Output, &buf);
        assert!((levels.level(MeterKind::Output) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn fall_is_gradual() {
        let mut meters = Meters::new(MeterMode::Peak, 100.0);
        meters.prepare(1000.0, 10);
        let levels = meters.levels();
        let loud = block(1, 10, 1.0);
        let silent = block(1, 10, 0.0);
        for buf in [&loud, &loud, &silent, &silent] {
            meters.begin_block(10);
            meters.process(MeterKind::Output, buf);
        }
        let level = levels.level(MeterKind::Output);
        assert!(level > 0.0 && level < 1.0);
    }
}
