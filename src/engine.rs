//! The recursive spellout evaluator.
//!
//! Evaluation of one input against one rule set is a short pipeline, applied
//! recursively:
//!
//! ```text
//! input ── select rule ──┬─ int base: greatest base value <= numeric(input)
//!                        └─ string base: first structural pattern match
//!            │
//!            v
//!      forward split      quotient/remainder by the rule's divisor, or the
//!            │            parts at the pattern's placeholders
//!            v
//!       sub loop          literals verbatim; rule refs recurse on the
//!            │            operand their operator selects; format subs
//!            v            delegate to the FormatProvider
//!     join + tidy         collapse doubled whitespace, trim
//! ```
//!
//! Rules whose substitutions are all literal terminate the recursion when
//! the input equals their base value exactly. For everything else the
//! operands shrink by at least one radix power per level, so depth is
//! bounded by the digit count of the input; [`MAX_DEPTH`] guards against
//! grammars whose mutual references do not shrink.
//!
//! Failures propagate unchanged through the recursion: no retries, and no
//! fallback to the raw numeral. The only silent case is a *private* rule
//! set producing empty output, which is legitimate (padding rule sets do).
//!
//! Each recursive call emits the matched rule, divisor and forward split at
//! `trace` level for grammar diagnosis.

use thiserror::Error;
use tracing::trace;

use crate::format::FormatProvider;
use crate::rules::{Base, BaseRule, Operator, RuleSet, RuleSetGroup, SubPayload};

/// Hard bound on recursion depth. Well-formed grammars recurse per radix
/// power and stay far below this; non-shrinking mutual references hit it
/// and fail predictably instead of overflowing the stack.
pub(crate) const MAX_DEPTH: usize = 64;

/// Evaluation-time errors. Construction-time problems are [`RuleError`]s
/// and can never reach this enum.
///
/// [`RuleError`]: crate::RuleError
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpelloutError {
    #[error("no matching base rule for '{input}' in rule set '{rule_set}'")]
    NoMatch { input: String, rule_set: String },
    #[error("rule set '{rule_set}' produced empty output for '{input}'")]
    EmptyOutput { rule_set: String, input: String },
    #[error("no such rule set group: {0}")]
    NoSuchGroup(String),
    #[error("no such rule set: {0}")]
    NoSuchRuleSet(String),
    #[error("recursion limit exceeded while spelling out '{input}'")]
    RecursionLimit { input: String },
    #[error("number formatting failed: {0}")]
    Format(String),
}

/// Evaluates spellout calls against one rule set group.
///
/// Borrows the (immutable) group and the formatting provider for the
/// duration of one call tree; holds no state of its own, so concurrent
/// evaluations over the same group are independent.
pub(crate) struct Evaluator<'a> {
    group: &'a RuleSetGroup,
    provider: &'a dyn FormatProvider,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(group: &'a RuleSetGroup, provider: &'a dyn FormatProvider) -> Self {
        Evaluator { group, provider }
    }

    pub(crate) fn spellout(
        &self,
        input: &str,
        rule_set: &RuleSet,
        depth: usize,
    ) -> Result<String, SpelloutError> {
        if depth > MAX_DEPTH {
            return Err(SpelloutError::RecursionLimit { input: input.to_string() });
        }

        let numeric = input.parse::<i64>().ok();
        let Some((rule, left, right)) = self.select(input, numeric, rule_set) else {
            return Err(SpelloutError::NoMatch {
                input: input.to_string(),
                rule_set: rule_set.name().to_string(),
            });
        };
        let divisor = rule.base().divisor();
        trace!(
            rule_set = rule_set.name(),
            input,
            base = %rule.base(),
            divisor,
            left = %left,
            right = %right,
            "matched rule"
        );

        // Terminal case: an exact hit on an all-literal rule spells itself.
        if let Base::Int { value, .. } = rule.base() {
            if value.to_string() == input && is_all_literal(rule) {
                let text: String = rule
                    .subs()
                    .iter()
                    .filter_map(|sub| match sub.payload() {
                        SubPayload::Literal(t) => Some(strip_quoting(t)),
                        _ => None,
                    })
                    .collect();
                return Ok(collapse(&text));
            }
        }

        let mut out = String::new();
        for sub in rule.subs() {
            // Bracketed subs are omitted on even multiples of the divisor.
            if sub.is_optional()
                && matches!(rule.base(), Base::Int { .. })
                && numeric.is_some_and(|n| n % divisor == 0)
            {
                continue;
            }
            match sub.payload() {
                SubPayload::Literal(text) => out.push_str(&strip_quoting(text)),
                SubPayload::RuleRef { target, op } => {
                    let operand = pick_operand(*op, &left, &right, input);
                    let name = target.trim_start_matches('%');
                    let next = if name.is_empty() {
                        rule_set
                    } else {
                        // Validated at group construction; kept as an error
                        // return rather than a panic.
                        self.group
                            .rule_set(name)
                            .ok_or_else(|| SpelloutError::NoSuchRuleSet(target.clone()))?
                    };
                    out.push_str(&self.spellout(operand, next, depth + 1)?);
                }
                SubPayload::NumericFormat { op, .. } => {
                    let operand = pick_operand(*op, &left, &right, input);
                    out.push_str(&self.provider.format_grouped(operand, self.group.language())?);
                }
                SubPayload::PluralFormat { cases, .. } => {
                    out.push_str(&self.provider.format_plural(
                        input,
                        self.group.language(),
                        cases,
                    )?);
                }
            }
        }

        let result = collapse(&out);
        if result.is_empty() && !rule_set.is_private() {
            return Err(SpelloutError::EmptyOutput {
                rule_set: rule_set.name().to_string(),
                input: input.to_string(),
            });
        }
        Ok(result)
    }

    /// Pick the rule that governs `input` and derive its forward split.
    ///
    /// String rules come first in each rule set and are tried in declaration
    /// order; the first structural match wins. Numeric rules are sorted
    /// ascending, so the last one whose base value does not exceed the input
    /// is the match.
    fn select<'r>(
        &self,
        input: &str,
        numeric: Option<i64>,
        rule_set: &'r RuleSet,
    ) -> Option<(&'r BaseRule, String, String)> {
        let mut best: Option<&BaseRule> = None;
        for rule in rule_set.rules() {
            match rule.base() {
                Base::Str(pattern) => {
                    if let Some((left, right)) = pattern.split(input) {
                        return Some((rule, left, right));
                    }
                }
                Base::Int { value, .. } => {
                    let n = numeric?;
                    if *value <= n {
                        best = Some(rule);
                    } else {
                        break;
                    }
                }
            }
        }
        let rule = best?;
        let n = numeric?;
        let divisor = rule.base().divisor();
        Some((rule, (n / divisor).to_string(), (n % divisor).to_string()))
    }
}

fn pick_operand<'s>(op: Operator, left: &'s str, right: &'s str, input: &'s str) -> &'s str {
    match op {
        Operator::Quotient => left,
        Operator::Remainder => right,
        Operator::Identity => input,
    }
}

fn is_all_literal(rule: &BaseRule) -> bool {
    rule.subs().iter().all(|sub| matches!(sub.payload(), SubPayload::Literal(_)))
}

/// Apostrophes quote-escape special characters in rule text; they never
/// reach the output.
fn strip_quoting(text: &str) -> String {
    text.replace('\'', "")
}

fn collapse(text: &str) -> String {
    regex!(r"\s\s+").replace_all(text, " ").trim().to_string()
}
