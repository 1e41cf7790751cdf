//! Rules, rule sets, groups and packages.

use std::collections::BTreeMap;

use super::sub::{Sub, SubPayload};
use super::{Base, RuleError};
use crate::engine::{Evaluator, SpelloutError};
use crate::format::{FormatProvider, GroupedDecimal};
use crate::lexer::lex;
use crate::Language;

/// One grammar rule: an activation condition and its ordered substitutions.
#[derive(Debug, Clone)]
pub struct BaseRule {
    base: Base,
    subs: Vec<Sub>,
}

impl BaseRule {
    /// Build a rule from already-parsed substitutions.
    pub fn new(base: Base, subs: Vec<Sub>) -> BaseRule {
        BaseRule { base, subs }
    }

    /// Numeric rule from body pieces, each piece one substitution in
    /// segment form (`"<<"`, `" "`, `"hundra"`, `"[ ]"`, `"[>>]"`).
    pub fn int(value: i64, radix: i64, pieces: &[&str]) -> Result<BaseRule, RuleError> {
        Ok(BaseRule { base: Base::int(value, radix), subs: parse_pieces(pieces)? })
    }

    /// Structural string rule from body pieces.
    pub fn string(pattern: &str, pieces: &[&str]) -> Result<BaseRule, RuleError> {
        Ok(BaseRule { base: Base::string(pattern), subs: parse_pieces(pieces)? })
    }

    /// Build a rule by lexing a complete rule body (`"←← komma[ →→]"`,
    /// terminating `;` implied if absent). ASCII `<`/`>` are accepted as
    /// arrow spellings. This is the seam the external grammar loader feeds.
    pub fn from_body(base: Base, body: &str) -> Result<BaseRule, RuleError> {
        let arrows: String = body
            .chars()
            .map(|c| match c {
                '<' => '←',
                '>' => '→',
                other => other,
            })
            .collect();
        let terminated =
            if arrows.ends_with(';') { arrows } else { format!("{arrows};") };
        let subs = lex(&terminated)?
            .iter()
            .map(|segment| Sub::parse(&segment.text))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BaseRule { base, subs })
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    pub fn subs(&self) -> &[Sub] {
        &self.subs
    }
}

fn parse_pieces(pieces: &[&str]) -> Result<Vec<Sub>, RuleError> {
    pieces.iter().map(|piece| Sub::parse(piece)).collect()
}

/// A named, ordered collection of rules covering one numeric or structural
/// domain. Private rule sets are internal to their group and may
/// legitimately produce empty output.
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    rules: Vec<BaseRule>,
    private: bool,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, rules: Vec<BaseRule>) -> RuleSet {
        RuleSet { name: name.into(), rules, private: false }
    }

    /// An internal-only rule set; empty spellout output is accepted.
    pub fn private(name: impl Into<String>, rules: Vec<BaseRule>) -> RuleSet {
        RuleSet { name: name.into(), rules, private: true }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> &[BaseRule] {
        &self.rules
    }
}

/// All rule sets defined together for one language, resolving references
/// among themselves. Read-only once constructed; safe to share across
/// threads for concurrent evaluation.
#[derive(Debug, Clone)]
pub struct RuleSetGroup {
    name: String,
    language: Language,
    rule_sets: BTreeMap<String, RuleSet>,
}

impl RuleSetGroup {
    /// Build a group: index the rule sets by name, order each set's numeric
    /// rules ascending by base value (string rules stay first, in
    /// declaration order), and verify that every rule reference names a
    /// rule set in the group.
    pub fn new(
        name: impl Into<String>,
        language: Language,
        rule_sets: Vec<RuleSet>,
    ) -> Result<RuleSetGroup, RuleError> {
        let mut map = BTreeMap::new();
        for mut rs in rule_sets {
            rs.rules.sort_by_key(|rule| match &rule.base {
                Base::Int { value, .. } => (1, *value),
                Base::Str(_) => (0, 0),
            });
            map.insert(rs.name.clone(), rs);
        }
        let group = RuleSetGroup { name: name.into(), language, rule_sets: map };
        group.validate_references()?;
        Ok(group)
    }

    fn validate_references(&self) -> Result<(), RuleError> {
        for (name, rule_set) in &self.rule_sets {
            for rule in &rule_set.rules {
                for sub in &rule.subs {
                    if let SubPayload::RuleRef { target, .. } = sub.payload() {
                        let referenced = target.trim_start_matches('%');
                        if !referenced.is_empty() && !self.rule_sets.contains_key(referenced) {
                            return Err(RuleError::UnresolvedReference {
                                rule_set: name.clone(),
                                target: target.clone(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Look up a rule set by name.
    pub fn rule_set(&self, name: &str) -> Option<&RuleSet> {
        self.rule_sets.get(name)
    }

    /// All rule set names, sorted.
    pub fn rule_set_names(&self) -> Vec<&str> {
        self.rule_sets.keys().map(String::as_str).collect()
    }

    /// Spell out `input` against the named rule set using the built-in
    /// locale-blind provider.
    pub fn spellout(&self, input: &str, rule_set_name: &str) -> Result<String, SpelloutError> {
        self.spellout_with(input, rule_set_name, &GroupedDecimal)
    }

    /// Spell out `input` against the named rule set, delegating numeric and
    /// plural formatting to `provider`.
    pub fn spellout_with(
        &self,
        input: &str,
        rule_set_name: &str,
        provider: &dyn FormatProvider,
    ) -> Result<String, SpelloutError> {
        let rule_set = self
            .rule_set(rule_set_name)
            .ok_or_else(|| SpelloutError::NoSuchRuleSet(rule_set_name.to_string()))?;
        Evaluator::new(self, provider).spellout(input, rule_set, 0)
    }
}

/// The evaluation entry point: a language and its ordered rule set groups.
#[derive(Debug, Clone)]
pub struct RulePackage {
    language: Language,
    groups: Vec<RuleSetGroup>,
}

impl RulePackage {
    /// Build a package, verifying that every group carries the package's
    /// language.
    pub fn new(language: Language, groups: Vec<RuleSetGroup>) -> Result<RulePackage, RuleError> {
        for group in &groups {
            if group.language != language {
                return Err(RuleError::LanguageMismatch {
                    group: group.name.clone(),
                    group_language: group.language.to_string(),
                    package_language: language.to_string(),
                });
            }
        }
        Ok(RulePackage { language, groups })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// The package's groups, in declaration order.
    pub fn groups(&self) -> &[RuleSetGroup] {
        &self.groups
    }

    fn group(&self, name: &str) -> Result<&RuleSetGroup, SpelloutError> {
        self.groups
            .iter()
            .find(|g| g.name == name)
            .ok_or_else(|| SpelloutError::NoSuchGroup(name.to_string()))
    }

    /// Spell out `input` using the named group and rule set with the
    /// built-in locale-blind provider.
    pub fn spellout(
        &self,
        input: &str,
        group_name: &str,
        rule_set_name: &str,
    ) -> Result<String, SpelloutError> {
        self.group(group_name)?.spellout(input, rule_set_name)
    }

    /// Spell out `input` with a caller-supplied formatting provider.
    pub fn spellout_with(
        &self,
        input: &str,
        group_name: &str,
        rule_set_name: &str,
        provider: &dyn FormatProvider,
    ) -> Result<String, SpelloutError> {
        self.group(group_name)?.spellout_with(input, rule_set_name, provider)
    }
}
