//! Rule-based number spellout.
//!
//! This crate turns numeral strings into natural-language text by evaluating
//! declarative, composable rule grammars in the style of ICU's Rule-Based
//! Number Format: `"725601"` becomes `"sju hundra tjugo-fem tusen sex hundra
//! ett"` under a Swedish cardinal grammar.
//!
//! The pipeline, leaf-first:
//!
//! ```text
//! rule body ── lexer::lex ──> segments        (lexer.rs)
//!                 │
//!                 v
//!             Sub::parse ──> typed subs       (rules/sub.rs)
//!                 │
//!                 v
//!   BaseRule / RuleSet / RuleSetGroup         (rules/, construction-time
//!                 │                            validation, eager pattern
//!                 v                            compilation)
//!       Evaluator::spellout                   (engine.rs, recursive)
//! ```
//!
//! Everything is built bottom-up and immutable after construction. Rule sets
//! reference each other by *name*, resolved through the owning group's map at
//! evaluation time, so mutually recursive grammars build without cycles.
//!
//! Locale-aware digit grouping and plural selection are behind the
//! [`FormatProvider`] seam; the built-in [`GroupedDecimal`] provider is
//! locale-blind and mainly useful for tests and plain-ASCII grammars.
//!
//! # Example
//!
//! ```
//! use spellrule::{BaseRule, Language, RuleSet, RuleSetGroup};
//!
//! let rules = RuleSet::new(
//!     "default",
//!     vec![
//!         BaseRule::int(0, 10, &["zero"]).unwrap(),
//!         BaseRule::int(1, 10, &["one"]).unwrap(),
//!         BaseRule::int(2, 10, &["two"]).unwrap(),
//!     ],
//! );
//! let group = RuleSetGroup::new("cardinal", Language::new("en"), vec![rules]).unwrap();
//! assert_eq!(group.spellout("2", "default").unwrap(), "two");
//! ```

#[macro_use]
mod macros;
mod engine;
mod format;
mod lexer;
mod pattern;
mod rules;

pub use engine::SpelloutError;
pub use format::{FormatProvider, GroupedDecimal};
pub use lexer::{LexError, Lexer, Segment, SegmentKind, lex};
pub use pattern::StringPattern;
pub use rules::{
    Base, BaseRule, Operator, PluralCase, RuleError, RulePackage, RuleSet, RuleSetGroup, Sub,
    SubPayload,
};

// --- Shared types -----------------------------------------------------------

/// A locale tag (`"sv"`, `"de"`, `"en"`) driving external formatting and
/// plural conventions.
///
/// The core never interprets the tag itself; it is attached to a
/// [`RulePackage`] and each of its [`RuleSetGroup`]s (which must agree) and is
/// handed through to the [`FormatProvider`] on every delegated format call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language(String);

impl Language {
    /// Create a language from a locale tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Language(tag.into())
    }

    /// The raw locale tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Language {
    fn from(tag: &str) -> Self {
        Language::new(tag)
    }
}
