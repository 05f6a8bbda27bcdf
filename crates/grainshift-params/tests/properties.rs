//! Property-based tests for the parameter model.
//!
//! Covers the biased curve's bounds and continuity, text round trips through
//! every unit, and monotonicity of modulated values in the macro.

use std::sync::Arc;

use grainshift_params::{
    MacroProcessor, ParamId, ParamLayout, ParamRange, Params, Unit, biased,
};
use proptest::prelude::*;

fn any_param_id() -> impl Strategy<Value = ParamId> {
    (0..ParamId::COUNT).prop_map(|i| ParamId::ALL[i])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// The biased curve stays within its endpoints for any bias, including
    /// the degenerate extremes.
    #[test]
    fn biased_stays_in_bounds(
        start in -100.0f32..100.0,
        span in 0.0f32..200.0,
        bias in -1.0f32..2.0,
        x in -0.5f32..1.5,
    ) {
        let end = start + span;
        let y = biased(start, end, bias, x);
        prop_assert!(y.is_finite());
        prop_assert!(y >= start - 1e-3 && y <= end + 1e-3, "{y} outside {start}..{end}");
    }

    /// Nearby inputs give nearby outputs for bias away from the extremes.
    #[test]
    fn biased_is_continuous(
        bias in 0.05f32..0.95,
        x in 0.0f32..0.999,
    ) {
        let a = biased(0.0, 1.0, bias, x);
        let b = biased(0.0, 1.0, bias, x + 1e-3);
        prop_assert!(b >= a);
        prop_assert!(b - a < 0.05, "jump {a} -> {b} at bias {bias}");
    }

    /// Normalizing then denormalizing a biased range recovers the value.
    #[test]
    fn range_round_trip(
        start in -50.0f32..50.0,
        span in 1.0f32..1000.0,
        centre_frac in 0.05f32..0.95,
        x in 0.0f32..=1.0,
    ) {
        let end = start + span;
        let range = ParamRange::with_centre(start, end, start + span * centre_frac);
        let v = range.convert_from_0to1(x);
        prop_assert!(v >= start && v <= end);
        let back = range.convert_from_0to1(range.convert_to_0to1(v));
        prop_assert!((back - v).abs() <= span * 1e-3, "{v} -> {back}");
    }

    /// Formatting a parameter's value and parsing the text lands on the
    /// same display text.
    #[test]
    fn text_round_trip_is_stable(id in any_param_id(), x in 0.0f32..=1.0) {
        let params = Params::new(&ParamLayout::full());
        let param = params.get(id).unwrap();
        let text = param.text(x);
        let again = param.text(param.value_for_text(&text));
        prop_assert_eq!(&again, &text, "{} at {}", param.name(), x);
    }

    /// Garbage text never escapes the normalized range.
    #[test]
    fn value_for_text_is_total(id in any_param_id(), text in ".{0,12}") {
        let params = Params::new(&ParamLayout::full());
        let v = params.get(id).unwrap().value_for_text(&text);
        prop_assert!((0.0..=1.0).contains(&v));
    }

    /// With a fixed depth and bias, the modulated value never decreases as
    /// the macro rises (or never increases for a negative depth).
    #[test]
    fn modulation_monotone_in_macro(
        value in 0.0f32..=1.0,
        depth in -1.0f32..=1.0,
        bias in 0.0f32..=1.0,
        m1 in 0.0f32..=1.0,
        m2 in 0.0f32..=1.0,
    ) {
        let params = Arc::new(Params::new(&ParamLayout::default()));
        let macros = MacroProcessor::new(Arc::clone(&params));
        let fb = params.get(ParamId::Feedback).unwrap();
        fb.set_value(value);
        fb.set_max_mod_depth(depth);
        fb.set_mod_bias(bias);
        let (lo, hi) = if m1 <= m2 { (m1, m2) } else { (m2, m1) };

        let macro_param = params.get(ParamId::Macro).unwrap();
        macro_param.set_value(lo);
        macros.apply();
        let at_lo = fb.value_mod();
        macro_param.set_value(hi);
        macros.apply();
        let at_hi = fb.value_mod();

        prop_assert!((0.0..=1.0).contains(&at_lo) && (0.0..=1.0).contains(&at_hi));
        // one ulp of slack for the curve's division
        if depth >= 0.0 {
            prop_assert!(at_hi >= at_lo - 1e-6);
        } else {
            prop_assert!(at_hi <= at_lo + 1e-6);
        }
    }
}

#[test]
fn every_unit_parses_its_own_format_for_switch_values() {
    let switches = [
        Unit::Power,
        Unit::Solo,
        Unit::Mute,
        Unit::Polarity,
        Unit::StereoConfig,
    ];
    for unit in switches {
        assert!(unit.is_switch());
        for v in [0.0, 1.0] {
            assert_eq!(unit.parse(&unit.format(v)), Ok(v), "{unit:?}");
        }
    }
}
