//! Error types for text parsing and parameter lookup.

use thiserror::Error;

/// Failure to evaluate a numeric expression typed into a parameter field.
///
/// Unit parsers swallow these and fall back to a default; the type is public
/// for callers that want the reason.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    /// Nothing left after trimming whitespace and the unit suffix.
    #[error("empty expression")]
    Empty,

    /// A character that cannot start or continue a token.
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar {
        /// Offending character.
        ch: char,
        /// Byte offset into the expression.
        pos: usize,
    },

    /// The expression stopped where an operand was required.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// An opening parenthesis was never closed.
    #[error("unclosed parenthesis opened at position {pos}")]
    UnclosedParen {
        /// Byte offset of the `(`.
        pos: usize,
    },

    /// A complete expression was followed by more input.
    #[error("trailing input at position {pos}")]
    TrailingInput {
        /// Byte offset where the leftover input starts.
        pos: usize,
    },

    /// Parentheses, signs or exponents nested past the evaluator's limit.
    #[error("expression nested too deeply at position {pos}")]
    TooDeep {
        /// Byte offset where the limit was reached.
        pos: usize,
    },

    /// The result was infinite or NaN (e.g. division by zero).
    #[error("expression does not evaluate to a finite number")]
    NonFinite,
}

impl ExprError {
    /// Create an unexpected-character error.
    pub fn unexpected(ch: char, pos: usize) -> Self {
        Self::UnexpectedChar { ch, pos }
    }
}

/// Errors from addressing parameters by name or restoring saved values.
#[derive(Debug, Error)]
pub enum ParamError {
    /// No parameter has this name or identifier.
    #[error("unknown parameter '{0}'")]
    Unknown(String),

    /// The parameter exists but the active layout does not register it.
    #[error("parameter '{0}' is not part of the active layout")]
    NotRegistered(String),

    /// Text could not be turned into a value.
    #[error("invalid value for '{param}'")]
    InvalidText {
        /// Parameter identifier.
        param: String,
        /// Why evaluation failed.
        #[source]
        source: ExprError,
    },
}

impl ParamError {
    /// Create an unknown-parameter error.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::Unknown(name.into())
    }

    /// Create a not-registered error.
    pub fn not_registered(name: impl Into<String>) -> Self {
        Self::NotRegistered(name.into())
    }

    /// Create an invalid-text error.
    pub fn invalid_text(param: impl Into<String>, source: ExprError) -> Self {
        Self::InvalidText {
            param: param.into(),
            source,
        }
    }
}
