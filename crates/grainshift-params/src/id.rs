//! Parameter identities.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ParamError;

/// Every parameter the processor knows, in registration order.
///
/// Which of them a given build registers is decided by
/// [`ParamLayout`](crate::ParamLayout); the five marked optional may be
/// absent. Serialized as the lowercase identifier (`"gainin"`,
/// `"numvoices"`), which is also what [`id_string`](Self::id_string) returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamId {
    /// Master macro driving all modulation.
    Macro,
    /// Input gain (optional).
    GainIn,
    /// Dry/wet mix.
    Mix,
    /// Output gain on the wet path.
    GainOut,
    /// Wet polarity inversion (optional).
    Polarity,
    /// Output gain compensates input gain (optional, needs `GainIn`).
    UnityGain,
    /// 2x oversampling (optional).
    Hq,
    /// L/R or M/S processing (optional).
    StereoConfig,
    /// Effect bypass switch.
    Power,
    /// Grain length in milliseconds.
    GrainSize,
    /// Coarse transposition in semitones.
    TuneSemi,
    /// Fine transposition in semitones.
    TuneFine,
    /// Wet feedback amount.
    Feedback,
    /// Number of detuned voices.
    NumVoices,
    /// Detune spread across voices in semitones.
    SpreadTune,
}

impl ParamId {
    /// Number of identities.
    pub const COUNT: usize = 15;

    /// All identities in registration order.
    pub const ALL: [ParamId; Self::COUNT] = [
        Self::Macro,
        Self::GainIn,
        Self::Mix,
        Self::GainOut,
        Self::Polarity,
        Self::UnityGain,
        Self::Hq,
        Self::StereoConfig,
        Self::Power,
        Self::GrainSize,
        Self::TuneSemi,
        Self::TuneFine,
        Self::Feedback,
        Self::NumVoices,
        Self::SpreadTune,
    ];

    /// Position in [`ALL`](Self::ALL).
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Human-readable name shown by hosts.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Macro => "Macro",
            Self::GainIn => "Gain In",
            Self::Mix => "Mix",
            Self::GainOut => "Gain Out",
            Self::Polarity => "Polarity",
            Self::UnityGain => "Unity Gain",
            Self::Hq => "HQ",
            Self::StereoConfig => "Stereo Config",
            Self::Power => "Power",
            Self::GrainSize => "Grain Size",
            Self::TuneSemi => "Tune Semi",
            Self::TuneFine => "Tune Fine",
            Self::Feedback => "Feedback",
            Self::NumVoices => "Num Voices",
            Self::SpreadTune => "Spread Tune",
        }
    }

    /// Stable identifier: the name lowercased with spaces removed.
    pub fn id_string(self) -> String {
        self.name()
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    }

    /// One-line help text.
    pub const fn tooltip(self) -> &'static str {
        match self {
            Self::Macro => "Dial in the macro to modulate every parameter that has a modulation depth.",
            Self::GainIn => "Apply gain to the input signal before it reaches the pitch shifter.",
            Self::Mix => "Blend the dry signal with the pitch-shifted one.",
            Self::GainOut => "Apply gain to the pitch-shifted signal before the mix.",
            Self::Polarity => "Invert the polarity of the pitch-shifted signal.",
            Self::UnityGain => "Let the output gain follow the input gain in the opposite direction.",
            Self::Hq => "Run the pitch shifter at twice the sample rate.",
            Self::StereoConfig => "Process left/right or mid/side.",
            Self::Power => "Bypass the effect while keeping the latency.",
            Self::GrainSize => "Length of each grain. Short grains sound metallic, long ones smear.",
            Self::TuneSemi => "Transposition in whole semitones.",
            Self::TuneFine => "Fine transposition in fractions of a semitone.",
            Self::Feedback => "Feed the shifted signal back into the grain buffer.",
            Self::NumVoices => "Number of pitch-shifted voices.",
            Self::SpreadTune => "Detune the voices against each other.",
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamId {
    type Err = ParamError;

    /// Accepts the display name (`"Gain In"`) or the identifier (`"gainin"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.name() == s || id.id_string() == s)
            .ok_or_else(|| ParamError::unknown(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_match_all() {
        for (i, id) in ParamId::ALL.iter().enumerate() {
            assert_eq!(id.ordinal(), i);
        }
    }

    #[test]
    fn id_strings() {
        assert_eq!(ParamId::GainIn.id_string(), "gainin");
        assert_eq!(ParamId::Hq.id_string(), "hq");
        assert_eq!(ParamId::NumVoices.id_string(), "numvoices");
        assert_eq!(ParamId::Macro.id_string(), "macro");
    }

    #[test]
    fn serde_name_matches_id_string() {
        for id in ParamId::ALL {
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.id_string()));
        }
    }

    #[test]
    fn parse_by_name_or_id() {
        assert_eq!("Spread Tune".parse::<ParamId>().unwrap(), ParamId::SpreadTune);
        assert_eq!("spreadtune".parse::<ParamId>().unwrap(), ParamId::SpreadTune);
        assert!("Wobble".parse::<ParamId>().is_err());
    }

    #[test]
    fn tooltips_are_present() {
        for id in ParamId::ALL {
            assert!(!id.tooltip().is_empty());
        }
    }
}
