//! Grainshift Core - real-time DSP primitives for the grainshift signal path
//!
//! Everything in this crate is allocation-free once prepared: buffers are
//! sized in `prepare` calls and reused on every block.
//!
//! # Control Signals
//!
//! - [`SmoothedValue`] - One-pole exponential approach toward a target
//! - [`SmoothedBlock`] - Block renderer over a [`SmoothedValue`] with a pre-sized buffer
//!
//! # Delay & Timing
//!
//! - [`WriteHead`] - Circular write index generator, doubles as a window-boundary clock
//! - [`Phasor`] - Phase accumulator in `[0, 1)`
//!
//! # Mixing & Metering
//!
//! - [`DryWetMix`] - Latency-compensated dry capture, gain staging and dry/wet recombination
//! - [`Meters`] - Windowed peak/RMS meters published through atomics
//! - [`EnvelopeFollower`] - Asymmetric rise/fall smoothing
//!
//! # Resampling & Interpolation
//!
//! - [`Oversampler`] - 2x half-band up/downsampler with integer latency
//! - [`lerp_wrapped`], [`cubic_hermite_wrapped`], [`cubic_hermite`] - Fractional reads
//!
//! # Buffers & Math
//!
//! - [`ChannelBuffer`] - Planar mono/stereo block buffer
//! - [`db_to_linear`], [`linear_to_db`], [`encode_mid_side`], [`decode_mid_side`]
//!
//! # no_std Support
//!
//! The crate builds without `std` (it still needs `alloc`):
//!
//! ```toml
//! [dependencies]
//! grainshift-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use grainshift_core::{ChannelBuffer, DryWetMix, MixControls, MixLaw};
//!
//! let mut mixer = DryWetMix::new(MixLaw::EqualPower, 20.0);
//! mixer.prepare(48000.0, 64, 0);
//!
//! let mut buffer = ChannelBuffer::new(1, 64);
//! buffer.set_len(64);
//! buffer.channel_mut(0).fill(0.5);
//!
//! mixer.save_dry(&mut buffer, &MixControls::default());
//! // ... wet processing happens here ...
//! mixer.process_out_gain(&mut buffer);
//! mixer.process_mix(&mut buffer);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod dry_wet;
pub mod envelope;
pub mod interpolation;
pub mod math;
pub mod meter;
pub mod oversample;
pub mod phasor;
pub mod smooth;
pub mod write_head;

pub use buffer::{ChannelBuffer, MAX_CHANNELS};
pub use dry_wet::{DryWetMix, LatencyCompensation, MixControls, MixLaw};
pub use envelope::EnvelopeFollower;
pub use interpolation::{cubic_hermite, cubic_hermite_wrapped, hermite, lerp_wrapped};
pub use math::{
    db_to_linear, decode_mid_side, encode_mid_side, flush_denormal, linear_to_db, ms_to_samples,
    samples_to_ms, semitones_to_ratio,
};
pub use meter::{MeterKind, MeterLevels, MeterMode, Meters};
pub use oversample::{OVERSAMPLING_FACTOR, Oversampler};
pub use phasor::Phasor;
pub use smooth::{SmoothedBlock, SmoothedValue, decay_coefficient};
pub use write_head::WriteHead;
