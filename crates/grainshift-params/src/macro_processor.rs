//! Pushes the macro into every parameter's modulation stage.

use std::sync::Arc;

use crate::{ParamId, Params};

/// Per-block macro modulation.
///
/// Reads the raw macro value and calls [`Parameter::modulate`] on every
/// other registered parameter. Must run before anything reads modulated
/// values in a block.
///
/// [`Parameter::modulate`]: crate::Parameter::modulate
#[derive(Debug, Clone)]
pub struct MacroProcessor {
    params: Arc<Params>,
}

impl MacroProcessor {
    /// Create a processor over a shared parameter set.
    pub fn new(params: Arc<Params>) -> Self {
        Self { params }
    }

    /// Modulate every non-macro parameter by the current macro value.
    pub fn apply(&self) {
        let macro_value = self.params.get(ParamId::Macro).map_or(0.0, |p| p.value());
        for param in self.params.iter().filter(|p| p.id() != ParamId::Macro) {
            param.modulate(macro_value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParamLayout;

    #[test]
    fn macro_at_zero_leaves_values() {
        let params = Arc::new(Params::new(&ParamLayout::full()));
        for p in params.iter() {
            p.set_max_mod_depth(0.5);
        }
        MacroProcessor::new(Arc::clone(&params)).apply();
        for p in params.iter() {
            assert_eq!(p.value_mod(), p.value(), "{}", p.name());
        }
    }

    #[test]
    fn macro_does_not_modulate_itself() {
        let params = Arc::new(Params::new(&ParamLayout::default()));
        let macro_param = params.get(ParamId::Macro).unwrap();
        macro_param.set_max_mod_depth(1.0);
        macro_param.set_value(0.6);
        MacroProcessor::new(Arc::clone(&params)).apply();
        assert_eq!(macro_param.value_mod(), 0.0);
    }

    #[test]
    fn full_macro_applies_full_depth() {
        let params = Arc::new(Params::new(&ParamLayout::default()));
        let feedback = params.get(ParamId::Feedback).unwrap();
        feedback.set_value(0.2);
        feedback.set_max_mod_depth(0.5);
        params.get(ParamId::Macro).unwrap().set_value(1.0);
        MacroProcessor::new(Arc::clone(&params)).apply();
        assert!((feedback.value_mod() - 0.7).abs() < 1e-5);
    }
}
