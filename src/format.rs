//! The external formatting seam.
//!
//! Numeric-format and plural-format substitutions delegate to services that
//! depend on locale data this crate deliberately does not carry. Callers
//! that need locale-faithful output (German `1.000.000`, Swedish non-breaking
//! spaces, CLDR plural selection) implement [`FormatProvider`] on top of
//! their locale backend and pass it to `spellout_with`.

use crate::engine::SpelloutError;
use crate::rules::PluralCase;
use crate::Language;

/// Locale-aware formatting operations consumed by the evaluator.
pub trait FormatProvider {
    /// Format a plain numeral string with digit grouping for `language`
    /// (`"1000000"` → `"1,000,000"` / `"1.000.000"` / …).
    fn format_grouped(
        &self,
        numeral: &str,
        language: &Language,
    ) -> Result<String, SpelloutError>;

    /// Pick and return the inflection text for `numeral` from `cases`
    /// according to `language`'s plural rules.
    fn format_plural(
        &self,
        numeral: &str,
        language: &Language,
        cases: &[PluralCase],
    ) -> Result<String, SpelloutError>;
}

/// The built-in locale-blind provider.
///
/// Groups integer digits in threes with `,` regardless of language, and
/// resolves plural formats to the `other` case (falling back to the last
/// case). Good enough for tests and plain-ASCII grammars; anything
/// locale-faithful belongs in a caller-supplied [`FormatProvider`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupedDecimal;

impl FormatProvider for GroupedDecimal {
    fn format_grouped(
        &self,
        numeral: &str,
        _language: &Language,
    ) -> Result<String, SpelloutError> {
        let (sign, rest) = match numeral.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", numeral),
        };
        let (int_part, frac_part) = match rest.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (rest, None),
        };
        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SpelloutError::Format(format!("not a numeral: '{numeral}'")));
        }

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        let mut out = String::new();
        out.push_str(sign);
        out.push_str(&grouped);
        if let Some(frac) = frac_part {
            out.push('.');
            out.push_str(frac);
        }
        Ok(out)
    }

    fn format_plural(
        &self,
        _numeral: &str,
        _language: &Language,
        cases: &[PluralCase],
    ) -> Result<String, SpelloutError> {
        let chosen = cases
            .iter()
            .find(|c| c.category == "other")
            .or_else(|| cases.last())
            .map(|c| c.text.clone())
            .unwrap_or_default();
        Ok(chosen)
    }
}
