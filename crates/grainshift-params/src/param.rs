//! The atomic [`Parameter`].
//!
//! All mutable state is stored as `f32` bit-cast into [`AtomicU32`], so the
//! UI thread, the host's automation thread and the audio thread can share a
//! parameter without locks. Each field has a single writer by convention:
//!
//! | Field | Writer |
//! |-------|--------|
//! | value, max mod depth, mod bias, lock | UI / host |
//! | modulated value | audio thread ([`Parameter::modulate`]) |
//! | gesture flags | UI sets, host-event pump drains |

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use crate::{BIAS_EPS, ExprError, ParamId, ParamRange, Unit, biased};

/// Flag indicating a gesture-begin is pending.
pub const GESTURE_BEGIN: u8 = 1;
/// Flag indicating a gesture-end is pending.
pub const GESTURE_END: u8 = 2;

/// Callback asking the host to pick up parameter changes.
///
/// Called after every value change or gesture edge that originates outside
/// host automation. Shared by all parameters of one instance.
pub type HostNotify = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// One automatable control.
///
/// The raw value is normalized to `[0, 1]`. The audio thread reads the
/// *modulated* value, which is the raw value offset by the macro through
/// [`modulate`](Self::modulate).
///
/// # Example
///
/// ```rust
/// use grainshift_params::{ParamId, ParamRange, Parameter, Unit};
///
/// let gain = Parameter::new(
///     ParamId::GainOut,
///     ParamRange::with_centre(-24.0, 24.0, 0.0),
///     0.0,
///     Unit::Decibel,
///     None,
/// );
/// gain.set_value(gain.value_for_text("6 db"));
/// assert!((gain.value_denorm() - 6.0).abs() < 1e-3);
/// assert_eq!(gain.text(gain.value()), "6.00 db");
/// ```
pub struct Parameter {
    id: ParamId,
    range: ParamRange,
    unit: Unit,
    default_norm: AtomicF32,
    value: AtomicF32,
    value_mod: AtomicF32,
    max_mod_depth: AtomicF32,
    mod_bias: AtomicF32,
    locked: AtomicBool,
    in_gesture: AtomicBool,
    gesture_flags: AtomicU8,
    host_notify: Option<HostNotify>,
}

impl core::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Parameter")
            .field("id", &self.id)
            .field("value", &self.value())
            .field("value_mod", &self.value_mod())
            .field("max_mod_depth", &self.max_mod_depth())
            .field("mod_bias", &self.mod_bias())
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

impl Parameter {
    /// Create a parameter at its default.
    ///
    /// `default` is a real-world value in `range`. Both the value and the
    /// modulated value start there; the bias starts linear and the mod depth
    /// at zero.
    pub fn new(
        id: ParamId,
        range: ParamRange,
        default: f32,
        unit: Unit,
        host_notify: Option<HostNotify>,
    ) -> Self {
        let norm = range.convert_to_0to1(default);
        Self {
            id,
            range,
            unit,
            default_norm: AtomicF32::new(norm),
            value: AtomicF32::new(norm),
            value_mod: AtomicF32::new(norm),
            max_mod_depth: AtomicF32::new(0.0),
            mod_bias: AtomicF32::new(0.5),
            locked: AtomicBool::new(false),
            in_gesture: AtomicBool::new(false),
            gesture_flags: AtomicU8::new(0),
            host_notify,
        }
    }

    /// Identity.
    pub fn id(&self) -> ParamId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    /// Real-world range.
    pub fn range(&self) -> &ParamRange {
        &self.range
    }

    /// Display unit.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Normalized raw value.
    pub fn value(&self) -> f32 {
        self.value.load()
    }

    /// Raw value in real-world units.
    pub fn value_denorm(&self) -> f32 {
        self.range.convert_from_0to1(self.value())
    }

    /// Set the normalized raw value. No-op while locked.
    pub fn set_value(&self, normalized: f32) {
        if self.is_locked() {
            return;
        }
        self.value.store(clamp_norm(normalized));
    }

    /// Set the raw value and tell the host about it.
    pub fn set_value_notifying_host(&self, normalized: f32) {
        if self.is_locked() {
            return;
        }
        self.set_value(normalized);
        self.notify_host();
    }

    /// Set the raw value wrapped in a one-shot gesture.
    ///
    /// Used by MIDI learn. Skipped entirely while a UI gesture is in progress,
    /// so a knob being dragged is not fought by an incoming controller.
    pub fn set_value_with_gesture(&self, normalized: f32) {
        if self.is_in_gesture() || self.is_locked() {
            return;
        }
        self.gesture_flags.fetch_or(GESTURE_BEGIN, Ordering::Release);
        self.set_value(normalized);
        self.gesture_flags.fetch_or(GESTURE_END, Ordering::Release);
        self.notify_host();
    }

    /// Start a UI gesture (drag start).
    pub fn begin_gesture(&self) {
        self.in_gesture.store(true, Ordering::Release);
        self.gesture_flags.fetch_or(GESTURE_BEGIN, Ordering::Release);
        self.notify_host();
    }

    /// End a UI gesture (drag stop).
    pub fn end_gesture(&self) {
        self.in_gesture.store(false, Ordering::Release);
        self.gesture_flags.fetch_or(GESTURE_END, Ordering::Release);
        self.notify_host();
    }

    /// Whether a UI gesture is in progress.
    pub fn is_in_gesture(&self) -> bool {
        self.in_gesture.load(Ordering::Acquire)
    }

    /// Atomically read and clear pending gesture flags.
    ///
    /// Returns the flags accumulated since the last call. Whoever forwards
    /// gestures to the host calls this once per block.
    pub fn take_gesture_flags(&self) -> u8 {
        self.gesture_flags.swap(0, Ordering::AcqRel)
    }

    /// Call the host-notify callback, if any.
    pub fn notify_host(&self) {
        if let Some(cb) = &self.host_notify {
            cb();
        }
    }

    /// Signed modulation depth in `[-1, 1]`.
    pub fn max_mod_depth(&self) -> f32 {
        self.max_mod_depth.load()
    }

    /// Set the modulation depth, clamped to `[-1, 1]`. No-op while locked.
    pub fn set_max_mod_depth(&self, depth: f32) {
        if self.is_locked() {
            return;
        }
        self.max_mod_depth.store(depth.clamp(-1.0, 1.0));
    }

    /// Modulation curve bias in `(0, 1)`; `0.5` is linear.
    pub fn mod_bias(&self) -> f32 {
        self.mod_bias.load()
    }

    /// Set the modulation bias, clamped away from `0` and `1`. No-op while
    /// locked.
    pub fn set_mod_bias(&self, bias: f32) {
        if self.is_locked() {
            return;
        }
        self.mod_bias.store(bias.clamp(BIAS_EPS, 1.0 - BIAS_EPS));
    }

    /// Normalized modulated value.
    pub fn value_mod(&self) -> f32 {
        self.value_mod.load()
    }

    /// Modulated value in real-world units.
    pub fn value_mod_denorm(&self) -> f32 {
        self.range.convert_from_0to1(self.value_mod())
    }

    /// Apply the macro to this parameter.
    ///
    /// The offset is the biased curve from `0` to the depth's magnitude,
    /// evaluated at `macro_value` and signed like the depth. With a zero
    /// depth the modulated value equals the raw value.
    pub fn modulate(&self, macro_value: f32) {
        let depth = self.max_mod_depth();
        let polarity = if depth > 0.0 { 1.0 } else { -1.0 };
        let offset = biased(0.0, depth * polarity, self.mod_bias(), macro_value) * polarity;
        self.value_mod.store(clamp_norm(self.value() + offset));
    }

    /// Normalized default.
    pub fn default_value(&self) -> f32 {
        self.default_norm.load()
    }

    /// Default in real-world units.
    pub fn default_denorm(&self) -> f32 {
        self.range.convert_from_0to1(self.default_value())
    }

    /// Replace the normalized default.
    pub fn set_default_value(&self, normalized: f32) {
        self.default_norm.store(clamp_norm(normalized));
    }

    /// Whether the parameter ignores value, depth and bias changes.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Lock or unlock.
    pub fn set_locked(&self, locked: bool) {
        self.locked.store(locked, Ordering::Release);
    }

    /// Flip the lock.
    pub fn switch_lock(&self) {
        self.locked.fetch_xor(true, Ordering::AcqRel);
    }

    /// Text for a normalized value: denormalize, snap, format.
    pub fn text(&self, normalized: f32) -> String {
        let denorm = self.range.convert_from_0to1(normalized);
        self.unit.format(self.range.snap_to_legal_value(denorm))
    }

    /// Normalized value for user text.
    ///
    /// Unparseable text yields the unit's fallback; the result is clamped to
    /// the range before normalizing.
    pub fn value_for_text(&self, text: &str) -> f32 {
        let denorm = self.unit.parse_or(text, self.unit.fallback());
        self.range.convert_to_0to1(self.range.clamp(denorm))
    }

    /// Like [`value_for_text`](Self::value_for_text) but reports parse
    /// failures instead of falling back.
    ///
    /// # Errors
    ///
    /// Returns the [`ExprError`] from the unit parser.
    pub fn try_value_for_text(&self, text: &str) -> Result<f32, ExprError> {
        let denorm = self.unit.parse(text)?;
        Ok(self.range.convert_to_0to1(self.range.clamp(denorm)))
    }
}

/// Clamp to `[0, 1]`, mapping NaN to `0`.
fn clamp_norm(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}
