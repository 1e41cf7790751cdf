//! Typed substitutions.
//!
//! A [`Sub`] is one ordered output-template element of a rule: literal text,
//! a recursive rule reference, a numeric-format delegation, or a
//! plural-format delegation, each optionally omissible. Segment text is
//! canonicalized (arrows to ASCII, U+2212 to `-`) before parsing, and every
//! parsed sub must re-serialize to that canonical text byte for byte; a
//! mismatch aborts rule construction rather than surfacing later as a wrong
//! spellout.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::RuleError;

// Identifiers for plural formats. Distinct rules may carry an identical case
// list with different inflected text, so every parsed PluralFormat gets its
// own id.
static NEXT_PLURAL_ID: AtomicU64 = AtomicU64::new(1);

/// Which operand of the forward split a substitution consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `<<` — the quotient (forward left).
    Quotient,
    /// `>>` — the remainder (forward right).
    Remainder,
    /// `==` — the whole input.
    Identity,
}

impl Operator {
    fn from_sigil(c: char) -> Option<Operator> {
        match c {
            '<' => Some(Operator::Quotient),
            '>' => Some(Operator::Remainder),
            '=' => Some(Operator::Identity),
            _ => None,
        }
    }

    fn sigil(self) -> char {
        match self {
            Operator::Quotient => '<',
            Operator::Remainder => '>',
            Operator::Identity => '=',
        }
    }
}

/// One inflection case of a plural format: a CLDR category name and its
/// replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralCase {
    pub category: String,
    pub text: String,
}

/// The payload of a substitution. A true sum type: exactly one of these is
/// ever populated, so the "two fields set at once" class of bugs cannot be
/// represented.
#[derive(Debug, Clone)]
pub enum SubPayload {
    /// Verbatim text. Apostrophe quote-escapes are kept here for exact
    /// serialization and stripped at emission time.
    Literal(String),
    /// A recursive reference to a rule set. `target` is stored exactly as
    /// written (including `%` sigils); an empty target means "this rule
    /// set".
    RuleRef { target: String, op: Operator },
    /// Digit formatting delegated to the external provider (`=#,##0=`,
    /// `=0=`). The pattern is carried for serialization only.
    NumericFormat { pattern: String, op: Operator },
    /// Inflection selection delegated to the external provider
    /// (`$(ordinal,one{st}other{th})$`). Applies to the whole input; the
    /// sigil form carries no operator.
    PluralFormat { id: u64, selector: String, cases: Vec<PluralCase> },
}

/// One parsed substitution: payload plus the independent Optional flag
/// (bracketed in the source).
#[derive(Debug, Clone)]
pub struct Sub {
    payload: SubPayload,
    optional: bool,
}

impl Sub {
    /// Parse one lexed segment into a substitution.
    ///
    /// The segment is canonicalized first; the parsed sub is then
    /// re-serialized and compared against that canonical text, and any
    /// mismatch is a construction-time error.
    pub fn parse(segment: &str) -> Result<Sub, RuleError> {
        let canonical = canonicalize(segment);
        let (body, optional) = strip_brackets(&canonical);
        let payload = parse_payload(body)?;
        let sub = Sub { payload, optional };
        let reserialized = sub.to_string();
        if reserialized != canonical {
            return Err(RuleError::SubParse { segment: canonical, reserialized });
        }
        Ok(sub)
    }

    pub fn payload(&self) -> &SubPayload {
        &self.payload
    }

    /// Whether the substitution was bracketed in the source and may be
    /// omitted at evaluation time.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The rule-set name a reference points at, `%` sigils stripped. `None`
    /// for non-reference payloads; `Some("")` for a self-reference.
    pub fn target_name(&self) -> Option<&str> {
        match &self.payload {
            SubPayload::RuleRef { target, .. } => Some(target.trim_start_matches('%')),
            _ => None,
        }
    }
}

impl fmt::Display for Sub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.payload {
            SubPayload::Literal(text) => text.clone(),
            SubPayload::RuleRef { target, op } => {
                format!("{sigil}{target}{sigil}", sigil = op.sigil())
            }
            SubPayload::NumericFormat { pattern, op } => {
                format!("{sigil}{pattern}{sigil}", sigil = op.sigil())
            }
            SubPayload::PluralFormat { selector, cases, .. } => {
                let mut s = format!("$({selector},");
                for case in cases {
                    s.push_str(&format!("{}{{{}}}", case.category, case.text));
                }
                s.push_str(")$");
                s
            }
        };
        if self.optional {
            write!(f, "[{body}]")
        } else {
            f.write_str(&body)
        }
    }
}

/// Map a segment to its canonical ASCII form: arrows become `<`/`>` and the
/// minus sign U+2212 becomes `-`.
fn canonicalize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            '←' => '<',
            '→' => '>',
            '−' => '-',
            other => other,
        })
        .collect()
}

fn strip_brackets(canonical: &str) -> (&str, bool) {
    if canonical.len() >= 2 && canonical.starts_with('[') && canonical.ends_with(']') {
        (&canonical[1..canonical.len() - 1], true)
    } else {
        (canonical, false)
    }
}

fn parse_payload(body: &str) -> Result<SubPayload, RuleError> {
    if body.starts_with('$') {
        return parse_plural(body);
    }
    if let Some((op, core)) = strip_operator(body) {
        if is_numeric_pattern(core) {
            return Ok(SubPayload::NumericFormat { pattern: core.to_string(), op });
        }
        return Ok(SubPayload::RuleRef { target: core.to_string(), op });
    }
    Ok(SubPayload::Literal(body.to_string()))
}

/// `<core<`, `>core>`, `=core=`: the same operator character at both ends.
fn strip_operator(body: &str) -> Option<(Operator, &str)> {
    let mut chars = body.chars();
    let first = chars.next()?;
    let op = Operator::from_sigil(first)?;
    if body.len() < 2 || !body.ends_with(first) {
        return None;
    }
    Some((op, &body[1..body.len() - 1]))
}

/// `#`-prefixed grouping patterns and bare zero patterns delegate to the
/// numeric formatter; everything else between operators names a rule set.
fn is_numeric_pattern(core: &str) -> bool {
    if core.starts_with('#') {
        return true;
    }
    core.starts_with('0') && core.chars().all(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '#'))
}

fn parse_plural(body: &str) -> Result<SubPayload, RuleError> {
    let shape = regex!(r"^\$\((\w+),((?:\w+\{[^{}]*\})+)\)\$$");
    let Some(caps) = shape.captures(body) else {
        return Err(RuleError::MalformedPlural { segment: body.to_string() });
    };
    let selector = caps[1].to_string();
    let cases = regex!(r"(\w+)\{([^{}]*)\}")
        .captures_iter(&caps[2])
        .map(|c| PluralCase { category: c[1].to_string(), text: c[2].to_string() })
        .collect();
    let id = NEXT_PLURAL_ID.fetch_add(1, Ordering::Relaxed);
    Ok(SubPayload::PluralFormat { id, selector, cases })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_reproduces_the_canonical_segment() {
        let segments = [
            "<<",
            ">>",
            "==",
            "<%spellout-cardinal-reale<",
            ">%cardinal-reale>",
            "=%default=",
            "=#,##0=",
            "=0=",
            "[>>]",
            "[ ]",
            "[-und-]",
            "minus",
            " komma",
            "' ",
            "$(cardinal,one{krona}other{kronor})$",
            "[$(ordinal,one{st}other{th})$]",
        ];
        for segment in segments {
            let sub = Sub::parse(segment).unwrap_or_else(|e| panic!("parsing '{segment}': {e}"));
            assert_eq!(sub.to_string(), segment, "round trip for '{segment}'");
        }
    }

    #[test]
    fn arrows_canonicalize_to_ascii() {
        let sub = Sub::parse("←%spellout-cardinal-reale←").unwrap();
        assert_eq!(sub.to_string(), "<%spellout-cardinal-reale<");
        assert!(matches!(
            sub.payload(),
            SubPayload::RuleRef { op: Operator::Quotient, .. }
        ));
        assert_eq!(sub.target_name(), Some("spellout-cardinal-reale"));
    }

    #[test]
    fn empty_target_means_current_rule_set() {
        let sub = Sub::parse(">>").unwrap();
        assert_eq!(sub.target_name(), Some(""));
        assert!(matches!(sub.payload(), SubPayload::RuleRef { op: Operator::Remainder, .. }));
    }

    #[test]
    fn brackets_set_the_optional_flag() {
        let sub = Sub::parse("[→→]").unwrap();
        assert!(sub.is_optional());
        assert_eq!(sub.to_string(), "[>>]");

        let sub = Sub::parse("[ ]").unwrap();
        assert!(sub.is_optional());
        assert!(matches!(sub.payload(), SubPayload::Literal(t) if t == " "));
    }

    #[test]
    fn numeric_patterns_are_classified_as_formats() {
        for (segment, pattern) in [("=#,##0=", "#,##0"), ("=0=", "0"), ("<0<", "0")] {
            let sub = Sub::parse(segment).unwrap();
            match sub.payload() {
                SubPayload::NumericFormat { pattern: p, .. } => assert_eq!(p, pattern),
                other => panic!("expected numeric format for '{segment}', got {other:?}"),
            }
        }
    }

    #[test]
    fn identity_reference_keeps_its_sigil() {
        let sub = Sub::parse("=%spellout-numbering=").unwrap();
        assert!(matches!(sub.payload(), SubPayload::RuleRef { op: Operator::Identity, .. }));
        assert_eq!(sub.target_name(), Some("spellout-numbering"));
        assert_eq!(sub.to_string(), "=%spellout-numbering=");
    }

    #[test]
    fn private_style_references_round_trip() {
        let sub = Sub::parse(">%%ord-fem-nde>").unwrap();
        assert_eq!(sub.to_string(), ">%%ord-fem-nde>");
        assert_eq!(sub.target_name(), Some("ord-fem-nde"));
    }

    #[test]
    fn plural_format_parses_cases_in_order() {
        let sub = Sub::parse("$(ordinal,one{st}two{nd}few{rd}other{th})$").unwrap();
        match sub.payload() {
            SubPayload::PluralFormat { selector, cases, .. } => {
                assert_eq!(selector, "ordinal");
                let got: Vec<(&str, &str)> =
                    cases.iter().map(|c| (c.category.as_str(), c.text.as_str())).collect();
                assert_eq!(got, [("one", "st"), ("two", "nd"), ("few", "rd"), ("other", "th")]);
            }
            other => panic!("expected plural format, got {other:?}"),
        }
    }

    #[test]
    fn plural_ids_never_collide() {
        let a = Sub::parse("$(cardinal,one{tusen}other{tusen})$").unwrap();
        let b = Sub::parse("$(cardinal,one{tusen}other{tusen})$").unwrap();
        let id = |s: &Sub| match s.payload() {
            SubPayload::PluralFormat { id, .. } => *id,
            _ => unreachable!(),
        };
        assert_ne!(id(&a), id(&b));
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn malformed_plural_is_rejected() {
        assert!(matches!(
            Sub::parse("$(cardinal one{x})$"),
            Err(RuleError::MalformedPlural { .. })
        ));
    }

    #[test]
    fn unbalanced_operator_is_a_literal() {
        // A lone operator character cannot bracket a core; the whole segment
        // is literal text.
        let sub = Sub::parse("<").unwrap();
        assert!(matches!(sub.payload(), SubPayload::Literal(t) if t == "<"));
    }
}
