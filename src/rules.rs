//! Rule model: bases, substitutions, rules, rule sets, groups, packages.
//!
//! Everything here is built bottom-up and immutable once constructed:
//!
//! ```text
//! Base ─┐
//!       ├─ BaseRule ── RuleSet ── RuleSetGroup ── RulePackage
//! Sub ──┘                              │
//!                                      └─ construction-time validation:
//!                                         sub round-trip, reference
//!                                         resolution, language match
//! ```
//!
//! Construction fails fast: a group or package that did not validate is
//! never returned, so evaluation can assume every reference resolves.
//! Cross-rule-set references stay name keys looked up through the group map
//! at evaluation time, which is what lets mutually referencing rule sets
//! (A → B → A) build without cycles.

use thiserror::Error;

use crate::lexer::LexError;

mod base;
mod rule_set;
mod sub;

pub use base::Base;
pub use rule_set::{BaseRule, RulePackage, RuleSet, RuleSetGroup};
pub use sub::{Operator, PluralCase, Sub, SubPayload};

/// Construction-time errors. Any of these aborts building the rule, group or
/// package; no partially usable object is ever handed out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("sub segment '{segment}' does not re-serialize to itself (got '{reserialized}')")]
    SubParse { segment: String, reserialized: String },
    #[error("malformed plural format: '{segment}'")]
    MalformedPlural { segment: String },
    #[error("no such rule set: {target} (referenced from rule set '{rule_set}')")]
    UnresolvedReference { rule_set: String, target: String },
    #[error("rule set group '{group}' is for language '{group_language}', package is for '{package_language}'")]
    LanguageMismatch { group: String, group_language: String, package_language: String },
}
