//! Conflict-checked composition of named rules.
//!
//! Every operation consumes the registry and hands back a new one, so a registry
//! that was composed further or linked can never be observed half-modified. Keep a
//! clone around to branch two dialects off a common base.

use indexmap::{IndexMap, IndexSet};

use crate::analysis::Analysis;
use crate::parser::{Parser, ParserConfig};
use crate::{CompositionError, Language, Rule, TokenSet};

type Result<T> = std::result::Result<T, CompositionError>;

/// Ordered map of rule definitions plus the set of entry rules.
pub struct Registry<L: Language> {
    rules: IndexMap<&'static str, Rule<L>>,
    entries: IndexSet<&'static str>,
}

impl<L: Language> Clone for Registry<L> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            entries: self.entries.clone(),
        }
    }
}

impl<L: Language> std::fmt::Debug for Registry<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("entries", &self.entries)
            .finish()
    }
}

impl<L: Language> Registry<L> {
    pub fn empty() -> Self {
        Self {
            rules: IndexMap::new(),
            entries: IndexSet::new(),
        }
    }

    /// Builds a registry from an initial rule set. Fails on duplicate names.
    pub fn create(rules: impl IntoIterator<Item = Rule<L>>) -> Result<Self> {
        Self::empty().add_many(rules)
    }

    pub fn add(self, rule: Rule<L>) -> Result<Self> {
        self.add_many([rule])
    }

    /// Adds all rules or none.
    pub fn add_many(mut self, rules: impl IntoIterator<Item = Rule<L>>) -> Result<Self> {
        let rules: Vec<Rule<L>> = rules.into_iter().collect();
        let mut seen = IndexSet::new();
        for rule in &rules {
            if self.rules.contains_key(rule.name) || !seen.insert(rule.name) {
                return Err(CompositionError::DuplicateRule(rule.name.to_string()));
            }
        }
        for rule in rules {
            tracing::trace!(rule = rule.name, "add rule");
            self.rules.insert(rule.name, rule);
        }
        Ok(self)
    }

    /// Removes a rule, typically so a fragment can replace an upstream production.
    pub fn delete(mut self, name: &str) -> Result<Self> {
        if self.rules.shift_remove(name).is_none() {
            return Err(CompositionError::RuleNotFound(name.to_string()));
        }
        self.entries.shift_remove(name);
        tracing::trace!(rule = name, "delete rule");
        Ok(self)
    }

    /// Replaces the implementation of an existing rule, keeping its name and position.
    pub fn patch(mut self, rule: Rule<L>) -> Result<Self> {
        let Some(slot) = self.rules.get_mut(rule.name) else {
            return Err(CompositionError::RuleNotFound(rule.name.to_string()));
        };
        tracing::trace!(rule = rule.name, "patch rule");
        *slot = rule;
        Ok(self)
    }

    /// Name-set union of two registries.
    ///
    /// A name defined by both sides must be resolved by a rule in `overrides`;
    /// otherwise the merge fails. Overrides may also replace rules defined by only one
    /// side. Entry rules of both sides are kept.
    pub fn merge(
        mut self,
        other: Registry<L>,
        overrides: impl IntoIterator<Item = Rule<L>>,
    ) -> Result<Self> {
        let mut overrides: IndexMap<&'static str, Rule<L>> = overrides
            .into_iter()
            .map(|rule| (rule.name, rule))
            .collect();

        for name in overrides.keys() {
            if !self.rules.contains_key(name) && !other.rules.contains_key(name) {
                return Err(CompositionError::RuleNotFound(name.to_string()));
            }
        }
        for name in other.rules.keys() {
            if self.rules.contains_key(name) && !overrides.contains_key(name) {
                return Err(CompositionError::AmbiguousMerge(name.to_string()));
            }
        }

        for (name, rule) in other.rules {
            self.rules.entry(name).or_insert(rule);
        }
        for (name, rule) in overrides.drain(..) {
            tracing::trace!(rule = name, "override rule");
            self.rules.insert(name, rule);
        }
        self.entries.extend(other.entries);
        Ok(self)
    }

    /// Declares the rules a linked parser may start from.
    pub fn entries(mut self, names: &[&str]) -> Result<Self> {
        for &name in names {
            let Some((&key, _)) = self.rules.get_key_value(name) else {
                return Err(CompositionError::RuleNotFound(name.to_string()));
            };
            self.entries.insert(key);
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Rule<L>> {
        self.rules.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().copied()
    }

    /// Links the catalog into an executable parser after static analysis.
    pub fn consume_to_parser<F>(self, vocabulary: TokenSet, context: F) -> Result<Parser<L>>
    where
        F: Fn() -> L::Context + Send + Sync + 'static,
    {
        self.consume_to_parser_with(vocabulary, context, ParserConfig::default())
    }

    pub fn consume_to_parser_with<F>(
        self,
        vocabulary: TokenSet,
        context: F,
        config: ParserConfig,
    ) -> Result<Parser<L>>
    where
        F: Fn() -> L::Context + Send + Sync + 'static,
    {
        let analysis = Analysis::run(&self.rules, &self.entries, vocabulary)?;
        let parser = Parser::link(self.rules, self.entries, analysis, Box::new(context), config);
        tracing::debug!(
            rules = parser.rule_count(),
            entries = ?parser.entry_names().collect::<Vec<_>>(),
            "linked grammar"
        );
        Ok(parser)
    }
}
