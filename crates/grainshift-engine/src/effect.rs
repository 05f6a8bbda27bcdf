//! The wet-path effect seam.
//!
//! The [`Processor`](crate::Processor) owns the gain, mix and resampling
//! stages and hands the oversampled wet block to a [`WetEffect`]. The
//! default is [`GranularPitchShifter`](crate::GranularPitchShifter); tests
//! and benches plug in simpler effects.

use grainshift_core::ChannelBuffer;

/// Denormalized controls for one block, read after macro modulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftControls {
    /// Transposition in semitones: rounded coarse tune plus fine tune.
    pub tune: f32,
    /// Grain length in milliseconds.
    pub grain_size_ms: f32,
    /// Feedback amount in `[0, 1]`.
    pub feedback: f32,
    /// Active voice count, at least 1.
    pub voices: usize,
    /// Detune spread across voices in semitones.
    pub spread: f32,
}

impl Default for ShiftControls {
    fn default() -> Self {
        Self {
            tune: 0.0,
            grain_size_ms: 120.0,
            feedback: 0.0,
            voices: 1,
            spread: 0.0,
        }
    }
}

/// Effect running inside the oversampled domain.
///
/// Every method except [`prepare`](Self::prepare) is called from the audio
/// thread and must not allocate.
///
/// # Example
///
/// ```rust
/// use grainshift_core::ChannelBuffer;
/// use grainshift_engine::{ShiftControls, WetEffect};
///
/// struct Silence;
///
/// impl WetEffect for Silence {
///     fn prepare(&mut self, _sample_rate: f32, _max_block: usize) {}
///
///     fn process(&mut self, buffer: &mut ChannelBuffer, _controls: &ShiftControls) {
///         buffer.clear();
///     }
///
///     fn reset(&mut self) {}
/// }
/// ```
pub trait WetEffect {
    /// Allocate for the oversampled rate and block size.
    fn prepare(&mut self, sample_rate: f32, max_block: usize);

    /// Process one oversampled block in place.
    fn process(&mut self, buffer: &mut ChannelBuffer, controls: &ShiftControls);

    /// Clear internal state without reallocating.
    fn reset(&mut self);

    /// Latency in oversampled samples.
    fn latency_samples(&self) -> usize {
        0
    }
}
