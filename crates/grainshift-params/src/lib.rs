//! Grainshift Params - the host-automatable parameter model.
//!
//! Every control of the processor is a [`Parameter`]: an atomic, normalized
//! value with a [`ParamRange`] for its real-world view, a [`Unit`] for text
//! conversion, and macro modulation state. Parameters are shared between the
//! UI thread and the audio thread without locks; each atomic field has a
//! single writer.
//!
//! # Per-block ordering
//!
//! The audio path never reads a raw parameter value. Once per block the
//! [`MacroProcessor`] pushes the macro into every parameter's modulation
//! stage, and only then are modulated values read:
//!
//! ```rust
//! use std::sync::Arc;
//! use grainshift_params::{MacroProcessor, ParamId, ParamLayout, Params};
//!
//! let params = Arc::new(Params::new(&ParamLayout::default()));
//! let macros = MacroProcessor::new(Arc::clone(&params));
//!
//! let feedback = params.get(ParamId::Feedback).unwrap();
//! feedback.set_max_mod_depth(0.5);
//! params.get(ParamId::Macro).unwrap().set_value(1.0);
//!
//! macros.apply();
//! assert!(feedback.value_mod() > feedback.value());
//! ```
//!
//! # Modules
//!
//! - [`expr`] - arithmetic evaluator behind text entry
//! - [`range`] - linear, biased and stepped value ranges
//! - [`unit`] - per-unit formatters and parsers
//! - [`param`] - the atomic [`Parameter`]
//! - [`registry`] - [`Params`], the ordered set built from a [`ParamLayout`]
//! - [`midi_learn`] - CC-to-parameter bindings

pub mod error;
pub mod expr;
pub mod id;
pub mod macro_processor;
pub mod midi_learn;
pub mod param;
pub mod range;
pub mod registry;
pub mod unit;

pub use error::{ExprError, ParamError};
pub use id::ParamId;
pub use macro_processor::MacroProcessor;
pub use midi_learn::{MidiBinding, MidiEvent, MidiLearn, MidiMessage, NUM_CC};
pub use param::{GESTURE_BEGIN, GESTURE_END, HostNotify, Parameter};
pub use range::{BIAS_EPS, ParamRange, RangeLaw, biased};
pub use registry::{ParamLayout, ParamSnapshot, Params};
pub use unit::Unit;
