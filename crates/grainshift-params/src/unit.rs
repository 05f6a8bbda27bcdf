//! Display units: how a real-world value becomes text and back.
//!
//! Formatting works on the real-world (denormalized) value. Parsing strips
//! the unit suffix, evaluates what is left as an arithmetic expression and
//! applies the unit's scaling, so `"50 %"`, `"50"` and `"100 / 2"` all mean
//! half on a percent control.

use serde::{Deserialize, Serialize};

use crate::ExprError;
use crate::expr::evaluate;

/// Display unit of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Enabled/Disabled switch.
    Power,
    /// Solo switch.
    Solo,
    /// Mute switch.
    Mute,
    /// `0..1` shown as `0..100 %`.
    Percent,
    /// Frequency.
    Hz,
    /// Tempo multiple.
    Beats,
    /// `0..1` shown as `0..180 °`.
    Degree,
    /// Whole octaves.
    Octaves,
    /// Whole semitones.
    Semi,
    /// Fractional semitones shown in cents.
    Fine,
    /// Milliseconds.
    Ms,
    /// Decibels.
    Decibel,
    /// `0..1` shown as a `dry : wet` ratio.
    Ratio,
    /// Phase-invert switch.
    Polarity,
    /// L/R or M/S switch.
    StereoConfig,
    /// Voice count.
    Voices,
}

impl Unit {
    /// Suffix appended by the formatter and stripped by the parser.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Power | Self::StereoConfig => "",
            Self::Solo => "S",
            Self::Mute => "M",
            Self::Percent => "%",
            Self::Hz => "hz",
            Self::Beats => "x",
            Self::Degree | Self::Polarity => "°",
            Self::Octaves => "oct",
            Self::Semi => "semi",
            Self::Fine => "fine",
            Self::Ms => "ms",
            Self::Decibel => "db",
            Self::Ratio => "ratio",
            Self::Voices => "v",
        }
    }

    /// Value used when text cannot be parsed.
    pub const fn fallback(self) -> f32 {
        match self {
            Self::Voices => 1.0,
            _ => 0.0,
        }
    }

    /// Whether the unit is an on/off switch.
    pub const fn is_switch(self) -> bool {
        matches!(
            self,
            Self::Power | Self::Solo | Self::Mute | Self::Polarity | Self::StereoConfig
        )
    }

    /// Render a real-world value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use grainshift_params::Unit;
    ///
    /// assert_eq!(Unit::Percent.format(0.256), "26 %");
    /// assert_eq!(Unit::Ms.format(120.04), "120.0 ms");
    /// assert_eq!(Unit::StereoConfig.format(1.0), "m/s");
    /// ```
    pub fn format(self, value: f32) -> String {
        let on = value > 0.5;
        match self {
            Self::Power => switch(on, "Enabled", "Disabled").into(),
            Self::Solo => switch(on, "Solo", "Not Solo").into(),
            Self::Mute => switch(on, "Mute", "Not Mute").into(),
            Self::Polarity => switch(on, "on", "off").into(),
            Self::StereoConfig => switch(on, "m/s", "l/r").into(),
            Self::Percent => format!("{} %", nearest(value * 100.0)),
            Self::Hz => format!("{} hz", hz_digits(value)),
            Self::Beats => format!("{} x", trimmed(value, 2)),
            Self::Degree => format!("{} °", nearest(value * 180.0)),
            Self::Octaves => format!("{} oct", whole(value)),
            Self::Semi => format!("{} semi", whole(value)),
            Self::Fine => format!("{} fine", nearest(value * 100.0)),
            Self::Ms => format!("{} ms", fixed(value, 1)),
            Self::Decibel => format!("{} db", fixed(value, 2)),
            Self::Ratio => {
                let wet = (value.clamp(0.0, 1.0) * 100.0).round() as i64;
                format!("{} : {}", 100 - wet, wet)
            }
            Self::Voices => format!("{}v", value.round() as i64),
        }
    }

    /// Parse user text into a real-world value.
    ///
    /// `Semi` and `Octaves` floor, like their formatters: `"-6.5 semi"` is
    /// `-7`, not the nearest step.
    ///
    /// # Errors
    ///
    /// Returns the [`ExprError`] when the text (after keyword matching and
    /// suffix stripping) is not a valid arithmetic expression.
    pub fn parse(self, text: &str) -> Result<f32, ExprError> {
        let text = text.trim();
        if let Some(v) = self.keyword(text) {
            return Ok(v);
        }
        let value = evaluate(strip_suffix(text, self.suffix()))?;
        Ok(match self {
            Self::Power | Self::Solo | Self::Mute | Self::Polarity | Self::StereoConfig => {
                if value > 0.5 { 1.0 } else { 0.0 }
            }
            Self::Percent | Self::Fine | Self::Ratio => value / 100.0,
            Self::Degree => value / 180.0,
            Self::Semi | Self::Octaves => value.floor(),
            Self::Hz | Self::Beats | Self::Ms | Self::Decibel | Self::Voices => value,
        })
    }

    /// Parse, substituting `fallback` for unparseable text.
    pub fn parse_or(self, text: &str, fallback: f32) -> f32 {
        self.parse(text).unwrap_or(fallback)
    }

    fn keyword(self, text: &str) -> Option<f32> {
        let t = text.to_ascii_lowercase();
        let (on, off): (&[&str], &[&str]) = match self {
            Self::Power => (&["enabled", "on", "true"], &["disabled", "off", "false"]),
            Self::Solo => (&["solo", "on"], &["not solo", "off"]),
            Self::Mute => (&["mute", "on"], &["not mute", "off"]),
            Self::Polarity => (&["on", "inverted"], &["off"]),
            Self::StereoConfig => (&["m/s", "ms", "mid/side"], &["l/r", "lr", "left/right"]),
            _ => return None,
        };
        if on.contains(&t.as_str()) {
            Some(1.0)
        } else if off.contains(&t.as_str()) {
            Some(0.0)
        } else {
            None
        }
    }
}

fn switch(on: bool, yes: &'static str, no: &'static str) -> &'static str {
    if on { yes } else { no }
}

/// Floor to an integer; also folds `-0.0` into `0`.
fn whole(x: f32) -> i64 {
    x.floor() as i64
}

/// Round to the nearest integer. A value parsed back from its own text must
/// display the same text, even when it lands an ulp below.
fn nearest(x: f32) -> i64 {
    x.round() as i64
}

/// Fixed decimals without a negative zero.
fn fixed(value: f32, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    if text.starts_with('-') && text.bytes().all(|b| matches!(b, b'-' | b'0' | b'.')) {
        text[1..].to_string()
    } else {
        text
    }
}

/// Up to five significant characters, four from 1000 to 9999 so the
/// thousands never show a dangling decimal point.
fn hz_digits(value: f32) -> String {
    let text = value.to_string();
    let keep = if (1000.0..10000.0).contains(&value) { 4 } else { 5 };
    let cut = text
        .char_indices()
        .nth(keep)
        .map_or(text.len(), |(i, _)| i);
    text[..cut].trim_end_matches('.').to_string()
}

/// Fixed decimals with trailing zeros removed.
fn trimmed(value: f32, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Remove `suffix` from the end of `text`, ignoring ASCII case.
fn strip_suffix<'a>(text: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() || text.len() < suffix.len() {
        return text;
    }
    let split = text.len() - suffix.len();
    match (text.get(..split), text.get(split..)) {
        (Some(head), Some(tail)) if tail.eq_ignore_ascii_case(suffix) => head.trim_end(),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_formats() {
        assert_eq!(Unit::Power.format(1.0), "Enabled");
        assert_eq!(Unit::Power.format(0.0), "Disabled");
        assert_eq!(Unit::Solo.format(1.0), "Solo");
        assert_eq!(Unit::Mute.format(0.2), "Not Mute");
        assert_eq!(Unit::Polarity.format(1.0), "on");
        assert_eq!(Unit::StereoConfig.format(0.0), "l/r");
    }

    #[test]
    fn numeric_formats() {
        assert_eq!(Unit::Percent.format(0.25), "25 %");
        assert_eq!(Unit::Degree.format(0.5), "90 °");
        assert_eq!(Unit::Semi.format(12.0), "12 semi");
        assert_eq!(Unit::Semi.format(-3.0), "-3 semi");
        assert_eq!(Unit::Octaves.format(2.7), "2 oct");
        assert_eq!(Unit::Fine.format(0.5), "50 fine");
        assert_eq!(Unit::Fine.format(-0.0), "0 fine");
        assert_eq!(Unit::Decibel.format(-6.021), "-6.02 db");
        assert_eq!(Unit::Decibel.format(0.0), "0.00 db");
        assert_eq!(Unit::Decibel.format(-0.001), "0.00 db");
        assert_eq!(Unit::Ms.format(70.0), "70.0 ms");
        assert_eq!(Unit::Ratio.format(0.25), "75 : 25");
        assert_eq!(Unit::Voices.format(7.0), "7v");
        assert_eq!(Unit::Beats.format(1.5), "1.5 x");
        assert_eq!(Unit::Beats.format(2.0), "2 x");
    }

    #[test]
    fn hz_truncates() {
        assert_eq!(Unit::Hz.format(440.0), "440 hz");
        assert_eq!(Unit::Hz.format(123.456), "123.4 hz");
        assert_eq!(Unit::Hz.format(1234.5), "1234 hz");
        assert_eq!(Unit::Hz.format(12345.6), "12345 hz");
    }

    #[test]
    fn parse_strips_suffix_and_scales() {
        assert_eq!(Unit::Percent.parse("50 %"), Ok(0.5));
        assert_eq!(Unit::Percent.parse("50%"), Ok(0.5));
        assert_eq!(Unit::Decibel.parse("-6 dB"), Ok(-6.0));
        assert_eq!(Unit::Ms.parse("100 / 2 ms"), Ok(50.0));
        assert_eq!(Unit::Semi.parse("7.9 semi"), Ok(7.0));
        assert_eq!(Unit::Semi.parse("-6.5 semi"), Ok(-7.0));
        assert_eq!(Unit::Octaves.parse("-0.5 oct"), Ok(-1.0));
        assert_eq!(Unit::Fine.parse("25 fine"), Ok(0.25));
        assert_eq!(Unit::Degree.parse("90 °"), Ok(0.5));
        assert_eq!(Unit::Voices.parse("3v"), Ok(3.0));
    }

    #[test]
    fn parse_switches() {
        assert_eq!(Unit::Power.parse("Enabled"), Ok(1.0));
        assert_eq!(Unit::Power.parse("off"), Ok(0.0));
        assert_eq!(Unit::Power.parse("0.7"), Ok(1.0));
        assert_eq!(Unit::Mute.parse("Not Mute"), Ok(0.0));
        assert_eq!(Unit::StereoConfig.parse("L/R"), Ok(0.0));
        assert_eq!(Unit::StereoConfig.parse("m/s"), Ok(1.0));
        assert_eq!(Unit::Polarity.parse("1 °"), Ok(1.0));
    }

    #[test]
    fn parse_failure_falls_back() {
        assert!(Unit::Decibel.parse("loud").is_err());
        assert_eq!(Unit::Decibel.parse_or("loud", 0.0), 0.0);
        assert_eq!(Unit::Voices.parse_or("", Unit::Voices.fallback()), 1.0);
        assert_eq!(Unit::Percent.fallback(), 0.0);
    }

    #[test]
    fn format_then_parse_is_stable_for_steps() {
        for semis in -24..=24 {
            let text = Unit::Semi.format(semis as f32);
            assert_eq!(Unit::Semi.parse(&text), Ok(semis as f32));
        }
        for voices in 1..=7 {
            let text = Unit::Voices.format(voices as f32);
            assert_eq!(Unit::Voices.parse(&text), Ok(voices as f32));
        }
    }
}
