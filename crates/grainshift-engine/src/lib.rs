//! Grainshift Engine - the real-time pitch-shifter pipeline.
//!
//! A [`Processor`] takes host blocks through MIDI learn, macro modulation,
//! latency-compensated dry capture, optional mid/side, 2x oversampling, a
//! [`WetEffect`] (by default the [`GranularPitchShifter`]) and the dry/wet
//! mix. The UI side talks to it through an [`EngineHandle`].
//!
//! # Threads
//!
//! | Context | Owns | Calls |
//! |---------|------|-------|
//! | audio | [`Processor`] | `prepare`, `process`, `reset` |
//! | UI | [`EngineHandle`] | `tick`, `state`, `restore_state`, parameter setters |
//!
//! Shared state is atomic throughout; nothing on the audio path blocks.
//!
//! # Configuration
//!
//! Build-time choices (optional parameters, mix law, meters, smoothing) come
//! from an [`EngineConfig`], usually loaded from TOML:
//!
//! ```rust
//! use grainshift_engine::{EngineConfig, Processor};
//!
//! let config = EngineConfig::from_toml_str(
//!     r#"
//!     mix_law = "linear"
//!     [layout]
//!     gain_in = true
//!     stereo_config = true
//!     "#,
//! )
//! .unwrap();
//! let mut processor = Processor::new(config);
//! processor.prepare(44100.0, 256);
//! ```

pub mod config;
pub mod effect;
pub mod error;
pub mod handle;
pub mod pitch_shifter;
pub mod processor;
pub mod suspend;

pub use config::{
    EngineConfig, MAX_VOICES_LIMIT, MeterConfig, MeterModeConfig, MixLawConfig,
};
pub use effect::{ShiftControls, WetEffect};
pub use error::ConfigError;
pub use handle::{EngineHandle, EngineState, RestartRequest};
pub use pitch_shifter::{GranularPitchShifter, MIN_GRAIN_MS, voice_detune};
pub use processor::{LatencyListener, Processor};
pub use suspend::ProcessSuspender;
