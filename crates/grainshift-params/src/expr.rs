//! Arithmetic evaluator for typed parameter values.
//!
//! Hosts and editors let users type `"-6 - 1.5"` or `"(3 + 4) / 2"` into a
//! value field. The grammar is small:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := power (('*' | '/') power)*
//! power   := unary ('^' power)?
//! unary   := ('-' | '+') unary | primary
//! primary := number | '(' expr ')'
//! number  := digits ('.' digits?)? | '.' digits
//! ```
//!
//! `^` is right-associative and binds tighter than unary minus on its left
//! operand only through parentheses: `-2^2` is `-(2^2)`.
//!
//! Nesting through parentheses, signs and exponents is capped at
//! [`MAX_DEPTH`]; deeper input is rejected with [`ExprError::TooDeep`].

use crate::ExprError;

/// Deepest nesting [`evaluate`] accepts.
pub const MAX_DEPTH: usize = 64;

/// Evaluate `text` to a finite number.
///
/// # Example
///
/// ```rust
/// use grainshift_params::expr::evaluate;
///
/// assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
/// assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
/// assert!(evaluate("1 / 0").is_err());
/// ```
pub fn evaluate(text: &str) -> Result<f32, ExprError> {
    let mut parser = Parser {
        src: text,
        pos: 0,
        depth: 0,
    };
    parser.skip_ws();
    if parser.at_end() {
        return Err(ExprError::Empty);
    }
    let value = parser.expr()?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(ExprError::TrailingInput { pos: parser.pos });
    }
    let value = value as f32;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExprError::NonFinite)
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Consume `op` if it is the next non-space character.
    fn eat(&mut self, op: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(op) {
            self.pos += op.len_utf8();
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<f64, ExprError> {
        let mut acc = self.term()?;
        loop {
            if self.eat('+') {
                acc += self.term()?;
            } else if self.eat('-') {
                acc -= self.term()?;
            } else {
                return Ok(acc);
            }
        }
    }

    fn term(&mut self) -> Result<f64, ExprError> {
        let mut acc = self.power()?;
        loop {
            if self.eat('*') {
                acc *= self.power()?;
            } else if self.eat('/') {
                acc /= self.power()?;
            } else {
                return Ok(acc);
            }
        }
    }

    // every recursive path (parens, signs, exponents) passes through here
    fn power(&mut self) -> Result<f64, ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep { pos: self.pos });
        }
        self.depth += 1;
        let value = self.power_inner();
        self.depth -= 1;
        value
    }

    fn power_inner(&mut self) -> Result<f64, ExprError> {
        let base = self.unary()?;
        if self.eat('^') {
            let exponent = self.power()?;
            Ok(base.powf(exponent))
        } else {
            Ok(base)
        }
    }

    fn unary(&mut self) -> Result<f64, ExprError> {
        if self.eat('-') {
            // -x^y negates the power, not the base
            return Ok(-self.power()?);
        }
        if self.eat('+') {
            return self.power();
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<f64, ExprError> {
        self.skip_ws();
        let start = self.pos;
        match self.peek() {
            None => Err(ExprError::UnexpectedEnd),
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                if self.eat(')') {
                    Ok(value)
                } else if self.at_end() {
                    Err(ExprError::UnclosedParen { pos: start })
                } else {
                    self.skip_ws();
                    Err(self.unexpected_here())
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(ExprError::unexpected(c, start)),
        }
    }

    fn number(&mut self) -> Result<f64, ExprError> {
        let start = self.pos;
        let bytes = self.src.as_bytes();
        let mut end = start;
        let mut seen_dot = false;
        let mut digits = 0;
        while end < bytes.len() {
            match bytes[end] {
                b'0'..=b'9' => digits += 1,
                b'.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            end += 1;
        }
        if digits == 0 {
            return Err(ExprError::unexpected('.', start));
        }
        self.pos = end;
        self.src[start..end]
            .parse::<f64>()
            .map_err(|_| ExprError::unexpected('.', start))
    }

    fn unexpected_here(&self) -> ExprError {
        match self.peek() {
            Some(c) => ExprError::unexpected(c, self.pos),
            None => ExprError::UnexpectedEnd,
        }
    }
}
