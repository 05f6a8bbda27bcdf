//! MIDI learn: bind continuous controllers to parameters.
//!
//! Arm a parameter with [`MidiLearn::assign`]; the next controller message
//! that arrives binds its CC number to that parameter. From then on every
//! message on that CC sets the parameter through
//! [`Parameter::set_value_with_gesture`](crate::Parameter::set_value_with_gesture),
//! which yields to a UI drag in progress.
//!
//! Slots hold parameter positions in atomics, so the UI thread can assign
//! and remove while the audio thread dispatches.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::{ParamId, Params};

/// Number of learnable controllers. CCs 120..=127 are channel-mode messages.
pub const NUM_CC: usize = 120;

const UNBOUND: usize = usize::MAX;
const VALUE_SCALE: f32 = 1.0 / 128.0;

/// Decoded MIDI message, reduced to what the processor handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Control change.
    ControlChange {
        /// Channel `0..16`.
        channel: u8,
        /// Controller number `0..128`.
        controller: u8,
        /// Value `0..128`.
        value: u8,
    },
    /// Anything else.
    Other,
}

/// A MIDI message at a sample position within the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    /// Offset from the start of the block.
    pub sample_offset: usize,
    /// The message.
    pub message: MidiMessage,
}

impl MidiEvent {
    /// Decode raw short-message bytes.
    pub fn from_bytes(sample_offset: usize, bytes: &[u8]) -> Self {
        let message = match bytes {
            [status, controller, value, ..] if status & 0xF0 == 0xB0 => {
                MidiMessage::ControlChange {
                    channel: status & 0x0F,
                    controller: controller & 0x7F,
                    value: value & 0x7F,
                }
            }
            _ => MidiMessage::Other,
        };
        Self {
            sample_offset,
            message,
        }
    }

    /// Build a control-change event.
    pub fn control_change(sample_offset: usize, channel: u8, controller: u8, value: u8) -> Self {
        Self {
            sample_offset,
            message: MidiMessage::ControlChange {
                channel: channel & 0x0F,
                controller: controller & 0x7F,
                value: value & 0x7F,
            },
        }
    }
}

/// A persisted CC binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiBinding {
    /// Controller number.
    pub cc: u8,
    /// Bound parameter, serialized by its string identifier.
    pub param: ParamId,
}

/// CC-to-parameter bindings for one processor instance.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use grainshift_params::{MidiEvent, MidiLearn, ParamId, ParamLayout, Params};
///
/// let params = Arc::new(Params::new(&ParamLayout::default()));
/// let learn = MidiLearn::new(Arc::clone(&params));
///
/// learn.assign(ParamId::Feedback);
/// learn.process(&[MidiEvent::control_change(0, 0, 21, 64)]);
/// assert_eq!(learn.binding(21), Some(ParamId::Feedback));
/// assert_eq!(params.get(ParamId::Feedback).unwrap().value(), 0.5);
/// ```
#[derive(Debug)]
pub struct MidiLearn {
    params: Arc<Params>,
    slots: Vec<AtomicUsize>,
    assignable: AtomicUsize,
    last_cc: AtomicUsize,
}

impl MidiLearn {
    /// Create with no bindings.
    pub fn new(params: Arc<Params>) -> Self {
        Self {
            params,
            slots: (0..NUM_CC).map(|_| AtomicUsize::new(UNBOUND)).collect(),
            assignable: AtomicUsize::new(UNBOUND),
            last_cc: AtomicUsize::new(UNBOUND),
        }
    }

    /// Arm `id` so the next incoming CC binds to it.
    ///
    /// Ignored for parameters the layout does not register.
    pub fn assign(&self, id: ParamId) {
        if let Some(index) = self.params.index_of(id) {
            self.assignable.store(index, Ordering::Release);
            tracing::debug!(param = %id, "midi learn armed");
        }
    }

    /// Parameter currently armed, if any.
    pub fn armed(&self) -> Option<ParamId> {
        self.param_at(self.assignable.load(Ordering::Acquire))
    }

    /// Disarm without binding.
    pub fn cancel_assign(&self) {
        self.assignable.store(UNBOUND, Ordering::Release);
    }

    /// Unbind every CC pointing at `id`.
    pub fn remove(&self, id: ParamId) {
        let Some(index) = self.params.index_of(id) else {
            return;
        };
        for slot in &self.slots {
            // Lost races just mean another thread rebound the slot first.
            let _ = slot.compare_exchange(index, UNBOUND, Ordering::AcqRel, Ordering::Acquire);
        }
        tracing::debug!(param = %id, "midi learn bindings removed");
    }

    /// Parameter bound to `cc`.
    pub fn binding(&self, cc: u8) -> Option<ParamId> {
        self.slots
            .get(usize::from(cc))
            .and_then(|slot| self.param_at(slot.load(Ordering::Acquire)))
    }

    /// Most recent learnable CC number seen, for display.
    pub fn last_cc(&self) -> Option<u8> {
        u8::try_from(self.last_cc.load(Ordering::Acquire)).ok()
    }

    /// Dispatch a block's MIDI events. Audio thread; never allocates.
    pub fn process(&self, events: &[MidiEvent]) {
        for event in events {
            let MidiMessage::ControlChange {
                controller, value, ..
            } = event.message
            else {
                continue;
            };
            let cc = usize::from(controller);
            let Some(slot) = self.slots.get(cc) else {
                continue;
            };
            self.last_cc.store(cc, Ordering::Release);

            let armed = self.assignable.swap(UNBOUND, Ordering::AcqRel);
            if armed != UNBOUND {
                slot.store(armed, Ordering::Release);
            }

            if let Some(param) = self.params.by_index(slot.load(Ordering::Acquire)) {
                param.set_value_with_gesture(f32::from(value) * VALUE_SCALE);
            }
        }
    }

    /// Current bindings in CC order.
    pub fn bindings(&self) -> Vec<MidiBinding> {
        (0..NUM_CC)
            .filter_map(|cc| {
                let cc = u8::try_from(cc).ok()?;
                self.binding(cc).map(|param| MidiBinding { cc, param })
            })
            .collect()
    }

    /// Replace all bindings.
    ///
    /// Bindings to CCs outside the learnable range or to unregistered
    /// parameters are dropped.
    pub fn restore_bindings(&self, bindings: &[MidiBinding]) {
        for slot in &self.slots {
            slot.store(UNBOUND, Ordering::Release);
        }
        for binding in bindings {
            match (
                self.slots.get(usize::from(binding.cc)),
                self.params.index_of(binding.param),
            ) {
                (Some(slot), Some(index)) => slot.store(index, Ordering::Release),
                _ => tracing::debug!(cc = binding.cc, param = %binding.param, "dropping midi binding"),
            }
        }
    }

    fn param_at(&self, index: usize) -> Option<ParamId> {
        self.params.by_index(index).map(|p| p.id())
    }
}
