//! Exponential smoothing for control signals on the audio path.
//!
//! Host automation and UI gestures arrive once per block as discontinuous
//! values. Feeding them straight into a gain stage produces zipper noise, so
//! every control that touches audio goes through a [`SmoothedValue`] first.
//!
//! ## Usage
//!
//! ```rust
//! use grainshift_core::SmoothedBlock;
//!
//! let mut mix = SmoothedBlock::new(1.0);
//! mix.prepare(48000.0, 512, 20.0);
//!
//! // One control value per block, one smoothed value per sample.
//! let curve = mix.process_block(0.5, 512);
//! assert!(curve[0] < 1.0 && curve[511] > 0.5);
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::expf;

/// Decay coefficient of a one-pole smoother.
///
/// `c = exp(-1 / (decay_ms * 0.001 * sample_rate))`. A non-positive decay time
/// (or sample rate) yields `0.0`, which makes the smoother jump straight to its
/// target.
///
/// # Example
///
/// ```rust
/// use grainshift_core::decay_coefficient;
///
/// assert_eq!(decay_coefficient(0.0, 48000.0), 0.0);
/// let c = decay_coefficient(20.0, 48000.0);
/// assert!(c > 0.99 && c < 1.0);
/// ```
#[inline]
pub fn decay_coefficient(decay_ms: f32, sample_rate: f32) -> f32 {
    let samples = decay_ms * 0.001 * sample_rate;
    if samples > 0.0 && samples.is_finite() {
        expf(-1.0 / samples)
    } else {
        0.0
    }
}

/// One-pole exponential approach toward a target.
///
/// Each step computes `y = target + c * (y - target)`. For `c` in `[0, 1)` the
/// output moves monotonically toward the target and never overshoots it.
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    coeff: f32,
}

impl SmoothedValue {
    /// Create a smoother resting at `initial`.
    ///
    /// The coefficient starts at `0.0` (no smoothing) until
    /// [`prepare`](Self::prepare) is called.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 0.0,
        }
    }

    /// Recompute the coefficient for a decay time and sample rate.
    pub fn prepare(&mut self, decay_ms: f32, sample_rate: f32) {
        self.coeff = decay_coefficient(decay_ms, sample_rate);
    }

    /// Step one sample toward `target` and return the new output.
    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        self.target = target;
        self.current = target + self.coeff * (self.current - target);
        self.current
    }

    /// Step one sample toward the most recent target.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.process(self.target)
    }

    /// Current output without stepping.
    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Most recent target.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Smoothing coefficient in use.
    #[inline]
    pub fn coefficient(&self) -> f32 {
        self.coeff
    }

    /// Jump to `value` with no ramp.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }
}

impl Default for SmoothedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// A [`SmoothedValue`] that renders whole blocks into a buffer owned by itself.
///
/// The buffer is sized by [`prepare`](Self::prepare); the block methods never
/// allocate and clamp the requested length to the prepared block size.
#[derive(Debug, Clone)]
pub struct SmoothedBlock {
    smooth: SmoothedValue,
    buffer: Vec<f32>,
    rendered: usize,
}

impl SmoothedBlock {
    /// Create a block smoother resting at `initial`.
    pub fn new(initial: f32) -> Self {
        Self {
            smooth: SmoothedValue::new(initial),
            buffer: Vec::new(),
            rendered: 0,
        }
    }

    /// Size the block buffer and set the decay time.
    pub fn prepare(&mut self, sample_rate: f32, block_size: usize, decay_ms: f32) {
        self.buffer.clear();
        self.buffer.resize(block_size, self.smooth.current());
        self.smooth.prepare(decay_ms, sample_rate);
        self.rendered = 0;
    }

    /// Fill `num_samples` values stepping toward a constant `target`.
    pub fn process_block(&mut self, target: f32, num_samples: usize) -> &[f32] {
        let n = num_samples.min(self.buffer.len());
        for slot in &mut self.buffer[..n] {
            *slot = self.smooth.process(target);
        }
        self.rendered = n;
        &self.buffer[..n]
    }

    /// Fill `num_samples` values continuing toward the last target.
    ///
    /// A ramp that is still in flight keeps moving; a settled value stays put.
    pub fn continue_block(&mut self, num_samples: usize) -> &[f32] {
        let n = num_samples.min(self.buffer.len());
        for slot in &mut self.buffer[..n] {
            *slot = self.smooth.advance();
        }
        self.rendered = n;
        &self.buffer[..n]
    }

    /// Single-sample step, bypassing the block buffer.
    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        self.smooth.process(target)
    }

    /// The values produced by the last block call.
    pub fn last_block(&self) -> &[f32] {
        &self.buffer[..self.rendered]
    }

    /// Prepared block capacity.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Underlying per-sample smoother.
    pub fn value(&self) -> &SmoothedValue {
        &self.smooth
    }

    /// Jump to `value` with no ramp.
    pub fn set_immediate(&mut self, value: f32) {
        self.smooth.set_immediate(value);
    }
}
