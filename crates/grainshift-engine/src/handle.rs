//! UI-thread view of a running processor.
//!
//! The [`Processor`](crate::Processor) lives on the audio thread. Everything
//! the UI needs (parameters, MIDI learn, meters, the timer hook and state
//! save/restore) goes through an [`EngineHandle`], which only touches shared
//! atomics.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use grainshift_core::MeterLevels;
use grainshift_params::{MidiBinding, MidiLearn, ParamId, ParamSnapshot, Params};
use serde::{Deserialize, Serialize};

use crate::ProcessSuspender;

/// Callback asking the host to call `prepare` again.
pub type RestartRequest = Arc<dyn Fn() + Send + Sync>;

pub(crate) const UNPREPARED: u8 = 0;
pub(crate) const PREPARED_PLAIN: u8 = 1;
pub(crate) const PREPARED_HQ: u8 = 2;

/// Everything that persists between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    /// One entry per registered parameter.
    pub params: Vec<ParamSnapshot>,
    /// MIDI learn bindings.
    #[serde(default)]
    pub midi: Vec<MidiBinding>,
}

/// Cloneable, thread-safe handle for the UI side.
#[derive(Clone)]
pub struct EngineHandle {
    pub(crate) params: Arc<Params>,
    pub(crate) midi_learn: Arc<MidiLearn>,
    pub(crate) levels: Arc<MeterLevels>,
    pub(crate) suspender: ProcessSuspender,
    pub(crate) oversampling: Arc<AtomicU8>,
    pub(crate) restart_request: Option<RestartRequest>,
}

impl core::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineHandle")
            .field("params", &self.params.len())
            .field("suspended", &self.suspender.is_suspended())
            .field("oversampling", &self.oversampling.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl EngineHandle {
    /// The registered parameters.
    pub fn params(&self) -> &Arc<Params> {
        &self.params
    }

    /// MIDI learn bindings.
    pub fn midi_learn(&self) -> &Arc<MidiLearn> {
        &self.midi_learn
    }

    /// Published meter levels.
    pub fn meter_levels(&self) -> &Arc<MeterLevels> {
        &self.levels
    }

    /// Shared suspend flag.
    pub fn suspender(&self) -> &ProcessSuspender {
        &self.suspender
    }

    /// Suspend processing and ask the host for a fresh `prepare`.
    pub fn request_restart(&self) {
        self.suspender.suspend();
        if let Some(restart) = &self.restart_request {
            restart();
        }
    }

    /// UI timer hook.
    ///
    /// When the HQ switch no longer matches what the processor was prepared
    /// with, suspends and requests a restart. Returns `true` if it did so on
    /// this tick.
    pub fn tick(&self) -> bool {
        let Some(hq) = self.params.get(ParamId::Hq) else {
            return false;
        };
        let prepared = match self.oversampling.load(Ordering::Acquire) {
            PREPARED_PLAIN => false,
            PREPARED_HQ => true,
            _ => return false,
        };
        if (hq.value() > 0.5) == prepared || self.suspender.is_suspended() {
            return false;
        }
        tracing::debug!(hq = !prepared, "oversampling changed, requesting restart");
        self.request_restart();
        true
    }

    /// Capture parameters and MIDI bindings.
    pub fn state(&self) -> EngineState {
        EngineState {
            params: self.params.snapshot(),
            midi: self.midi_learn.bindings(),
        }
    }

    /// Apply saved state and request a restart so HQ takes effect.
    ///
    /// Returns how many parameter snapshots were applied.
    pub fn restore_state(&self, state: &EngineState) -> usize {
        let applied = self.params.restore(&state.params);
        self.midi_learn.restore_bindings(&state.midi);
        tracing::debug!(
            applied,
            bindings = state.midi.len(),
            "engine state restored"
        );
        self.request_restart();
        applied
    }
}
