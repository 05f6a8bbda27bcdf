//! Engine configuration loaded from TOML.
//!
//! Everything here is fixed for the lifetime of a [`Processor`](crate::Processor):
//! which optional parameters exist, the mix law, meter behaviour and
//! smoothing time. Per-block controls live in the parameters instead.
//!
//! # TOML Format
//!
//! ```toml
//! mix_law = "equal_power"
//! smoothing_ms = 20.0
//!
//! [layout]
//! gain_in = true
//! hq = true
//! stereo_config = true
//! max_grain_ms = 1000.0
//! max_voices = 7
//!
//! [meters]
//! mode = "rms"
//! refresh_rate_hz = 30.0
//! ```

use std::path::Path;

use grainshift_core::{MeterMode, MixLaw};
use grainshift_params::ParamLayout;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Most voices a layout may ask for.
pub const MAX_VOICES_LIMIT: u32 = 16;

/// Dry/wet crossfade law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixLawConfig {
    /// Square-root gains, constant power.
    #[default]
    EqualPower,
    /// Straight-line gains.
    Linear,
}

impl From<MixLawConfig> for MixLaw {
    fn from(law: MixLawConfig) -> Self {
        match law {
            MixLawConfig::EqualPower => MixLaw::EqualPower,
            MixLawConfig::Linear => MixLaw::Linear,
        }
    }
}

/// Meter measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterModeConfig {
    /// Window peak.
    #[default]
    Peak,
    /// Window RMS.
    Rms,
}

impl From<MeterModeConfig> for MeterMode {
    fn from(mode: MeterModeConfig) -> Self {
        match mode {
            MeterModeConfig::Peak => MeterMode::Peak,
            MeterModeConfig::Rms => MeterMode::Rms,
        }
    }
}

/// Meter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Peak or RMS.
    pub mode: MeterModeConfig,
    /// Windows per second; the window is `sample_rate / refresh_rate_hz`.
    pub refresh_rate_hz: f32,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            mode: MeterModeConfig::Peak,
            refresh_rate_hz: 30.0,
        }
    }
}

/// Everything a [`Processor`](crate::Processor) is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dry/wet law.
    pub mix_law: MixLawConfig,
    /// Time constant of gain and mix smoothing.
    pub smoothing_ms: f32,
    /// Optional parameters and size bounds.
    pub layout: ParamLayout,
    /// Level meters.
    pub meters: MeterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mix_law: MixLawConfig::EqualPower,
            smoothing_ms: 20.0,
            layout: ParamLayout::default(),
            meters: MeterConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Defaults with every optional parameter enabled.
    pub fn full() -> Self {
        Self {
            layout: ParamLayout::full(),
            ..Self::default()
        }
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), "engine config saved");
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.smoothing_ms.is_finite() && self.smoothing_ms >= 0.0) {
            return Err(ConfigError::invalid(
                "smoothing_ms",
                format!("must be a non-negative number, got {}", self.smoothing_ms),
            ));
        }
        let rate = self.meters.refresh_rate_hz;
        if !(rate > 0.0 && rate <= 1000.0) {
            return Err(ConfigError::invalid(
                "meters.refresh_rate_hz",
                format!("must be in (0, 1000], got {rate}"),
            ));
        }
        let grain = self.layout.max_grain_ms;
        if !(grain.is_finite() && grain > 20.0) {
            return Err(ConfigError::invalid(
                "layout.max_grain_ms",
                format!("must be above 20 ms, got {grain}"),
            ));
        }
        let voices = self.layout.max_voices;
        if !(1..=MAX_VOICES_LIMIT).contains(&voices) {
            return Err(ConfigError::invalid(
                "layout.max_voices",
                format!("must be in 1..={MAX_VOICES_LIMIT}, got {voices}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert!(!config.layout.gain_in);
        assert!(config.layout.hq);
        assert_eq!(config.mix_law, MixLawConfig::EqualPower);
        assert_eq!(config.meters.mode, MeterModeConfig::Peak);
        assert_eq!(config.meters.refresh_rate_hz, 30.0);
        assert_eq!(config.layout.max_voices, 7);
        assert_eq!(config.smoothing_ms, 20.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            mix_law = "linear"
            [layout]
            gain_in = true
            [meters]
            mode = "rms"
            "#,
        )
        .unwrap();
        assert_eq!(config.mix_law, MixLawConfig::Linear);
        assert!(config.layout.gain_in);
        assert!(config.layout.hq);
        assert_eq!(config.meters.mode, MeterModeConfig::Rms);
        assert_eq!(config.meters.refresh_rate_hz, 30.0);
    }

    #[test]
    fn toml_round_trip() {
        let config = EngineConfig {
            smoothing_ms: 5.0,
            ..EngineConfig::full()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn validation_rejects_bad_fields() {
        let cases = [
            ("meters.refresh_rate_hz", "[meters]\nrefresh_rate_hz = 0.0"),
            ("meters.refresh_rate_hz", "[meters]\nrefresh_rate_hz = 2000.0"),
            ("layout.max_voices", "[layout]\nmax_voices = 0"),
            ("layout.max_voices", "[layout]\nmax_voices = 17"),
            ("layout.max_grain_ms", "[layout]\nmax_grain_ms = 5.0"),
            ("smoothing_ms", "smoothing_ms = -1.0"),
        ];
        for (field, text) in cases {
            match EngineConfig::from_toml_str(text) {
                Err(ConfigError::Invalid { field: f, .. }) => assert_eq!(f, field, "{text}"),
                other => panic!("expected invalid {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_enum_value_is_parse_error() {
        let err = EngineConfig::from_toml_str("mix_law = \"cubic\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn enum_conversions() {
        assert_eq!(MixLaw::from(MixLawConfig::Linear), MixLaw::Linear);
        assert_eq!(MeterMode::from(MeterModeConfig::Rms), MeterMode::Rms);
    }
}
