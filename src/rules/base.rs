//! Rule activation conditions.

use crate::pattern::StringPattern;

/// A rule's activation condition: a numeric threshold with a radix, or a
/// structural string pattern. Exactly one variant is ever active, by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Base {
    /// Triggers for numeric input `>= value`. The radix feeds divisor
    /// arithmetic and defaults to 10 in grammars that do not override it.
    Int { value: i64, radix: i64 },
    /// Triggers when the input structurally matches an `x`-placeholder
    /// pattern such as `"-x"` or `"x.x"`. The matcher is compiled here, at
    /// construction, never lazily.
    Str(StringPattern),
}

impl Base {
    /// Numeric base with an explicit radix.
    pub fn int(value: i64, radix: i64) -> Base {
        Base::Int { value, radix }
    }

    /// Structural string base; compiles the pattern matcher eagerly.
    pub fn string(pattern: &str) -> Base {
        Base::Str(StringPattern::new(pattern))
    }

    /// The divisor that splits input into quotient and remainder: the
    /// largest power `radix^k` (k >= 1) not exceeding the base value, or 1
    /// when no such power exists. String bases have no divisor arithmetic
    /// and report 1.
    pub fn divisor(&self) -> i64 {
        match self {
            Base::Int { value, radix } => {
                if *radix < 2 {
                    return 1;
                }
                let mut divisor = 1;
                let mut power = *radix;
                while power <= *value {
                    divisor = power;
                    power = match power.checked_mul(*radix) {
                        Some(p) => p,
                        None => break,
                    };
                }
                divisor
            }
            Base::Str(_) => 1,
        }
    }
}

impl std::fmt::Display for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Base::Int { value, radix: 10 } => write!(f, "{value}"),
            Base::Int { value, radix } => write!(f, "{value}/{radix}"),
            Base::Str(p) => write!(f, "\"{}\"", p.pattern()),
        }
    }
}
