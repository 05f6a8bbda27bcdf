//! The parameter set of one processor instance.
//!
//! Which optional parameters exist is a build decision captured by
//! [`ParamLayout`]. [`Params`] registers the enabled ones in [`ParamId::ALL`]
//! order and gives lookup by identity, by position and by name.

use serde::{Deserialize, Serialize};

use crate::{HostNotify, ParamError, ParamId, ParamRange, Parameter, Unit};

/// Which optional parameters exist, and the bounds of the size-dependent ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamLayout {
    /// Register `GainIn` (input gain staging and the input meter).
    pub gain_in: bool,
    /// Register `Hq` (oversampling toggle).
    pub hq: bool,
    /// Register `UnityGain`; only honoured together with `gain_in`.
    pub unity_gain: bool,
    /// Register `StereoConfig` (mid/side processing).
    pub stereo_config: bool,
    /// Register `Polarity`.
    pub polarity: bool,
    /// Upper bound of `GrainSize`, also the grain buffer capacity.
    pub max_grain_ms: f32,
    /// Upper bound of `NumVoices`.
    pub max_voices: u32,
}

impl Default for ParamLayout {
    fn default() -> Self {
        Self {
            gain_in: false,
            hq: true,
            unity_gain: false,
            stereo_config: false,
            polarity: false,
            max_grain_ms: 1000.0,
            max_voices: 7,
        }
    }
}

impl ParamLayout {
    /// Every optional parameter enabled.
    pub fn full() -> Self {
        Self {
            gain_in: true,
            hq: true,
            unity_gain: true,
            stereo_config: true,
            polarity: true,
            ..Self::default()
        }
    }

    /// Whether `id` is registered under this layout.
    pub fn includes(&self, id: ParamId) -> bool {
        match id {
            ParamId::GainIn => self.gain_in,
            ParamId::Hq => self.hq,
            ParamId::UnityGain => self.unity_gain && self.gain_in,
            ParamId::StereoConfig => self.stereo_config,
            ParamId::Polarity => self.polarity,
            _ => true,
        }
    }

    /// Range, real-world default and unit of `id`.
    pub fn definition(&self, id: ParamId) -> (ParamRange, f32, Unit) {
        let max_voices = self.max_voices.max(1) as f32;
        let max_grain = self.max_grain_ms.max(GRAIN_MIN_MS + 1.0);
        match id {
            ParamId::Macro => (ParamRange::linear(0.0, 1.0), 0.0, Unit::Percent),
            ParamId::GainIn => (ParamRange::with_centre(-12.0, 12.0, 0.0), 0.0, Unit::Decibel),
            ParamId::Mix => (ParamRange::linear(0.0, 1.0), 1.0, Unit::Percent),
            ParamId::GainOut => (ParamRange::with_centre(-24.0, 24.0, 0.0), 0.0, Unit::Decibel),
            ParamId::Polarity => (ParamRange::toggle(), 0.0, Unit::Polarity),
            ParamId::UnityGain => (ParamRange::toggle(), 1.0, Unit::Polarity),
            ParamId::Hq => (ParamRange::toggle(), 1.0, Unit::Power),
            ParamId::StereoConfig => (ParamRange::toggle(), 1.0, Unit::StereoConfig),
            ParamId::Power => (ParamRange::toggle(), 1.0, Unit::Power),
            ParamId::GrainSize => (
                ParamRange::with_centre(GRAIN_MIN_MS, max_grain, GRAIN_CENTRE_MS.min(max_grain)),
                GRAIN_DEFAULT_MS.min(max_grain),
                Unit::Ms,
            ),
            ParamId::TuneSemi => (ParamRange::stepped(-24.0, 24.0, 1.0), 12.0, Unit::Semi),
            ParamId::TuneFine => (ParamRange::linear(-1.0, 1.0), 0.0, Unit::Fine),
            ParamId::Feedback => (ParamRange::linear(0.0, 1.0), 0.16, Unit::Percent),
            ParamId::NumVoices => (
                ParamRange::stepped(1.0, max_voices, 1.0),
                max_voices,
                Unit::Voices,
            ),
            ParamId::SpreadTune => (ParamRange::with_centre(0.0, 1.0, 0.19), 0.19, Unit::Fine),
        }
    }
}

const GRAIN_MIN_MS: f32 = 10.0;
const GRAIN_CENTRE_MS: f32 = 70.0;
const GRAIN_DEFAULT_MS: f32 = 120.0;

/// Saved state of one parameter.
///
/// `value` and `default_value` are normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSnapshot {
    /// Which parameter.
    pub id: ParamId,
    /// Normalized raw value.
    pub value: f32,
    /// Modulation depth in `[-1, 1]`.
    pub max_mod_depth: f32,
    /// Modulation bias.
    pub mod_bias: f32,
    /// Normalized default.
    pub default_value: f32,
}

/// Ordered, registered parameters.
///
/// # Example
///
/// ```rust
/// use grainshift_params::{ParamId, ParamLayout, Params};
///
/// let params = Params::new(&ParamLayout::default());
/// assert!(params.get(ParamId::GainIn).is_none());
/// assert_eq!(params.find("Grain Size").unwrap().id(), ParamId::GrainSize);
/// assert_eq!(params.find("numvoices").unwrap().value_denorm(), 7.0);
/// ```
#[derive(Debug)]
pub struct Params {
    layout: ParamLayout,
    params: Vec<Parameter>,
    index: [Option<usize>; ParamId::COUNT],
}

impl Params {
    /// Register the parameters enabled by `layout`.
    pub fn new(layout: &ParamLayout) -> Self {
        Self::with_host_notify(layout, None)
    }

    /// Register parameters sharing one host-notify callback.
    pub fn with_host_notify(layout: &ParamLayout, host_notify: Option<HostNotify>) -> Self {
        let mut params = Vec::with_capacity(ParamId::COUNT);
        let mut index = [None; ParamId::COUNT];
        for id in ParamId::ALL.into_iter().filter(|id| layout.includes(*id)) {
            let (range, default, unit) = layout.definition(id);
            index[id.ordinal()] = Some(params.len());
            params.push(Parameter::new(id, range, default, unit, host_notify.clone()));
        }
        tracing::debug!(count = params.len(), "parameters registered");
        Self {
            layout: layout.clone(),
            params,
            index,
        }
    }

    /// Layout the set was built from.
    pub fn layout(&self) -> &ParamLayout {
        &self.layout
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Always false: `Macro` and the core parameters are unconditional.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: ParamId) -> bool {
        self.index_of(id).is_some()
    }

    /// Parameter by identity.
    pub fn get(&self, id: ParamId) -> Option<&Parameter> {
        self.index_of(id).map(|i| &self.params[i])
    }

    /// Registration position of `id`.
    pub fn index_of(&self, id: ParamId) -> Option<usize> {
        self.index[id.ordinal()]
    }

    /// Parameter by registration position.
    pub fn by_index(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    /// Parameter by display name or string identifier.
    pub fn find(&self, name_or_id: &str) -> Option<&Parameter> {
        name_or_id
            .parse::<ParamId>()
            .ok()
            .and_then(|id| self.get(id))
    }

    /// Like [`find`](Self::find) with the reason for a miss.
    ///
    /// # Errors
    ///
    /// [`ParamError::Unknown`] for a name nothing answers to and
    /// [`ParamError::NotRegistered`] for a parameter this layout leaves out.
    pub fn lookup(&self, name_or_id: &str) -> Result<&Parameter, ParamError> {
        let id = name_or_id.parse::<ParamId>()?;
        self.get(id)
            .ok_or_else(|| ParamError::not_registered(id.id_string()))
    }

    /// Registered parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    /// Modulated value of `id`, normalized.
    pub fn value_mod(&self, id: ParamId) -> Option<f32> {
        self.get(id).map(Parameter::value_mod)
    }

    /// Modulated value of `id` in real-world units.
    pub fn value_mod_denorm(&self, id: ParamId) -> Option<f32> {
        self.get(id).map(Parameter::value_mod_denorm)
    }

    /// Save every registered parameter.
    pub fn snapshot(&self) -> Vec<ParamSnapshot> {
        self.params
            .iter()
            .map(|p| ParamSnapshot {
                id: p.id(),
                value: p.value(),
                max_mod_depth: p.max_mod_depth(),
                mod_bias: p.mod_bias(),
                default_value: p.default_value(),
            })
            .collect()
    }

    /// Apply saved parameters.
    ///
    /// Locked parameters keep their state entirely. Snapshots for
    /// parameters this layout does not register are skipped. Returns how
    /// many snapshots were applied.
    pub fn restore(&self, snapshots: &[ParamSnapshot]) -> usize {
        let mut applied = 0;
        for snap in snapshots {
            let Some(param) = self.get(snap.id) else {
                tracing::debug!(param = %snap.id, "skipping snapshot for unregistered parameter");
                continue;
            };
            if param.is_locked() {
                continue;
            }
            param.set_value_notifying_host(snap.value);
            param.set_max_mod_depth(snap.max_mod_depth);
            param.set_mod_bias(snap.mod_bias);
            param.set_default_value(snap.default_value);
            applied += 1;
        }
        tracing::debug!(applied, total = snapshots.len(), "parameter state restored");
        applied
    }
}
