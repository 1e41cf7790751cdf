//! Structural pattern matching for string-base rules.
//!
//! A string-base rule triggers on the *shape* of the input rather than its
//! magnitude: `"-x"` matches negative numerals, `"x.x"` decimal forms,
//! `"x%"` percentages. Each `x` is a placeholder for a non-empty run of
//! input; everything else must appear literally.
//!
//! The pattern is compiled into an anchored regex once, at construction.
//! Evaluation only ever reads the compiled matcher, so concurrent spellout
//! calls over the same rule set share no mutable state.

use regex::Regex;

/// A compiled `x`-placeholder pattern.
#[derive(Debug, Clone)]
pub struct StringPattern {
    pattern: String,
    placeholders: usize,
    matcher: Regex,
}

impl StringPattern {
    /// Compile `pattern` into a matcher. All placeholders but the last are
    /// non-greedy so the split happens at the first occurrence of the fixed
    /// text, like a plain substring split would.
    pub fn new(pattern: &str) -> Self {
        let placeholders = pattern.chars().filter(|&c| c == 'x').count();
        let mut src = String::from("^");
        let mut seen = 0;
        for c in pattern.chars() {
            if c == 'x' {
                seen += 1;
                src.push_str(if seen < placeholders { "(.+?)" } else { "(.+)" });
            } else {
                src.push_str(&regex::escape(&c.to_string()));
            }
        }
        src.push('$');
        // Escaped literals plus fixed capture groups always form a valid
        // expression.
        let matcher = Regex::new(&src).unwrap();
        StringPattern { pattern: pattern.to_string(), placeholders, matcher }
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Match `input` against the pattern and derive the forward split: the
    /// part left of the fixed text and the part right of it. A placeholder
    /// before the fixed text feeds the left side, one after it the right
    /// side; a missing placeholder yields an empty part.
    pub fn split(&self, input: &str) -> Option<(String, String)> {
        let caps = self.matcher.captures(input)?;
        let part = |i: usize| caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
        match self.placeholders {
            0 => Some((String::new(), String::new())),
            1 if self.pattern.starts_with('x') => Some((part(1), String::new())),
            1 => Some((String::new(), part(1))),
            _ => Some((part(1), part(2))),
        }
    }
}

impl PartialEq for StringPattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_form_splits_right() {
        let p = StringPattern::new("-x");
        assert_eq!(p.split("-18"), Some((String::new(), "18".to_string())));
        assert_eq!(p.split("18"), None);
        assert_eq!(p.split("-"), None);
    }

    #[test]
    fn decimal_form_splits_both_sides() {
        let p = StringPattern::new("x.x");
        assert_eq!(p.split("3.18"), Some(("3".to_string(), "18".to_string())));
        assert_eq!(p.split("318"), None);
    }

    #[test]
    fn comma_decimal_form() {
        let p = StringPattern::new("x,x");
        assert_eq!(p.split("3,18"), Some(("3".to_string(), "18".to_string())));
    }

    #[test]
    fn trailing_symbol_splits_left() {
        let p = StringPattern::new("x%");
        assert_eq!(p.split("316%"), Some(("316".to_string(), String::new())));
        assert_eq!(p.split("316"), None);

        let p = StringPattern::new("x‰");
        assert_eq!(p.split("7‰"), Some(("7".to_string(), String::new())));
    }

    #[test]
    fn split_happens_at_first_fixed_occurrence() {
        let p = StringPattern::new("x.x");
        assert_eq!(p.split("3.1.8"), Some(("3".to_string(), "1.8".to_string())));
    }

    #[test]
    fn fixed_text_is_escaped_literally() {
        // '.' in the pattern must not behave as a regex wildcard.
        let p = StringPattern::new("x.x");
        assert_eq!(p.split("3x18"), None);
    }
}
