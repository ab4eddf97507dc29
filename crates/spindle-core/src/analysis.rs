//! Static analysis run while linking a registry.
//!
//! Shapes are checked against the token vocabulary, references are resolved, and
//! nullable/FIRST sets are computed by fixed-point iteration. Those sets feed the
//! left-recursion and ambiguity checks and, after linking, the runtime lookahead.
//!
//! Ambiguity is judged at one token of lookahead: two ungated alternatives of the
//! same `Alt` must not share a FIRST token. Anything needing more lookahead is
//! expressed as a gated alternative, whose predicate decides at runtime.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use crate::shape::Shape;
use crate::{CompositionError, Language, Rule, TokenSet};

type Result<T> = std::result::Result<T, CompositionError>;

#[derive(Debug, Clone)]
pub(crate) struct Analysis {
    pub(crate) first: IndexMap<&'static str, TokenSet>,
    pub(crate) nullable: IndexMap<&'static str, bool>,
}

impl Analysis {
    pub(crate) fn run<L: Language>(
        rules: &IndexMap<&'static str, Rule<L>>,
        entries: &IndexSet<&'static str>,
        vocabulary: TokenSet,
    ) -> Result<Self> {
        check_vocabulary(rules, vocabulary)?;
        check_references(rules)?;
        check_reachable(rules, entries)?;

        let mut analysis = Analysis {
            first: rules.keys().map(|&name| (name, TokenSet::EMPTY)).collect(),
            nullable: rules.keys().map(|&name| (name, false)).collect(),
        };
        analysis.fixed_point(rules);

        check_left_recursion(rules, &analysis)?;

        let names = kind_names(rules);
        for rule in rules.values() {
            analysis.check_shape::<L>(rule.name, &rule.shape, &names)?;
        }

        Ok(analysis)
    }

    fn fixed_point<L: Language>(&mut self, rules: &IndexMap<&'static str, Rule<L>>) {
        loop {
            let mut changed = false;
            for rule in rules.values() {
                let nullable = self.shape_nullable::<L>(&rule.shape);
                let first = self.shape_first::<L>(&rule.shape);
                if self.nullable[rule.name] != nullable {
                    self.nullable.insert(rule.name, nullable);
                    changed = true;
                }
                if self.first[rule.name] != first {
                    self.first.insert(rule.name, first);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
    }

    pub(crate) fn shape_nullable<L: Language>(&self, shape: &Shape<L::Kind>) -> bool {
        match shape {
            Shape::Empty | Shape::Opt(_) | Shape::Many(_) => true,
            Shape::Token(_) => false,
            Shape::Rule(name) => self.nullable.get(name).copied().unwrap_or(false),
            Shape::Seq(items) => items.iter().all(|s| self.shape_nullable::<L>(s)),
            Shape::Alt(items) => items.iter().any(|s| self.shape_nullable::<L>(s)),
            Shape::AtLeastOne(inner) | Shape::Gated(inner) => self.shape_nullable::<L>(inner),
        }
    }

    pub(crate) fn shape_first<L: Language>(&self, shape: &Shape<L::Kind>) -> TokenSet {
        match shape {
            Shape::Empty => TokenSet::EMPTY,
            Shape::Token(kind) => TokenSet::single::<L>(*kind),
            Shape::Rule(name) => self.first.get(name).copied().unwrap_or_default(),
            Shape::Seq(items) => {
                let mut set = TokenSet::EMPTY;
                for item in items {
                    set = set.union(self.shape_first::<L>(item));
                    if !self.shape_nullable::<L>(item) {
                        break;
                    }
                }
                set
            }
            Shape::Alt(items) => items
                .iter()
                .fold(TokenSet::EMPTY, |acc, s| acc.union(self.shape_first::<L>(s))),
            Shape::Opt(inner)
            | Shape::Many(inner)
            | Shape::AtLeastOne(inner)
            | Shape::Gated(inner) => self.shape_first::<L>(inner),
        }
    }

    /// Rules that may run before any token is consumed.
    fn left_refs<L: Language>(&self, shape: &Shape<L::Kind>, out: &mut Vec<&'static str>) {
        match shape {
            Shape::Empty | Shape::Token(_) => {}
            Shape::Rule(name) => {
                if !out.contains(name) {
                    out.push(*name);
                }
            }
            Shape::Seq(items) => {
                for item in items {
                    self.left_refs::<L>(item, out);
                    if !self.shape_nullable::<L>(item) {
                        break;
                    }
                }
            }
            Shape::Alt(items) => {
                for item in items {
                    self.left_refs::<L>(item, out);
                }
            }
            Shape::Opt(inner)
            | Shape::Many(inner)
            | Shape::AtLeastOne(inner)
            | Shape::Gated(inner) => self.left_refs::<L>(inner, out),
        }
    }

    fn check_shape<L: Language>(
        &self,
        rule: &'static str,
        shape: &Shape<L::Kind>,
        names: &HashMap<u16, String>,
    ) -> Result<()> {
        match shape {
            Shape::Empty | Shape::Token(_) | Shape::Rule(_) => Ok(()),
            Shape::Seq(items) => {
                for item in items {
                    self.check_shape::<L>(rule, item, names)?;
                }
                Ok(())
            }
            Shape::Alt(items) => {
                self.check_alternatives::<L>(rule, items, names)?;
                for item in items {
                    self.check_shape::<L>(rule, item, names)?;
                }
                Ok(())
            }
            Shape::Many(inner) | Shape::AtLeastOne(inner) => {
                if self.shape_nullable::<L>(inner) {
                    return Err(CompositionError::NullableRepetition(rule.to_string()));
                }
                self.check_shape::<L>(rule, inner, names)
            }
            Shape::Opt(inner) | Shape::Gated(inner) => self.check_shape::<L>(rule, inner, names),
        }
    }

    fn check_alternatives<L: Language>(
        &self,
        rule: &'static str,
        items: &[Shape<L::Kind>],
        names: &HashMap<u16, String>,
    ) -> Result<()> {
        let ungated: Vec<(usize, &Shape<L::Kind>)> = items
            .iter()
            .enumerate()
            .filter(|(_, s)| !matches!(s, Shape::Gated(_)))
            .collect();

        for (pos, &(i, shape)) in ungated.iter().enumerate() {
            if self.shape_nullable::<L>(shape) && i + 1 != items.len() {
                return Err(CompositionError::NullableAlternative {
                    rule: rule.to_string(),
                    index: i,
                });
            }
            let first = self.shape_first::<L>(shape);
            for &(j, other) in &ungated[pos + 1..] {
                let overlap = first.intersection(self.shape_first::<L>(other));
                if !overlap.is_empty() {
                    let tokens = overlap
                        .iter_raw()
                        .map(|raw| names.get(&raw).cloned().unwrap_or_else(|| raw.to_string()))
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(CompositionError::AmbiguousAlternatives {
                        rule: rule.to_string(),
                        first: i,
                        second: j,
                        tokens,
                    });
                }
            }
        }
        Ok(())
    }
}

fn check_vocabulary<L: Language>(
    rules: &IndexMap<&'static str, Rule<L>>,
    vocabulary: TokenSet,
) -> Result<()> {
    for rule in rules.values() {
        for kind in rule.shape.tokens() {
            if !vocabulary.contains::<L>(kind) {
                return Err(CompositionError::UnknownToken {
                    rule: rule.name.to_string(),
                    token: kind.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_references<L: Language>(rules: &IndexMap<&'static str, Rule<L>>) -> Result<()> {
    for rule in rules.values() {
        for target in rule.shape.refs() {
            if !rules.contains_key(target) {
                return Err(CompositionError::UnresolvedRule {
                    rule: rule.name.to_string(),
                    target: target.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn check_reachable<L: Language>(
    rules: &IndexMap<&'static str, Rule<L>>,
    entries: &IndexSet<&'static str>,
) -> Result<()> {
    if entries.is_empty() {
        return Err(CompositionError::NoEntryRule);
    }

    let mut reached: IndexSet<&'static str> = IndexSet::new();
    let mut stack: Vec<&'static str> = entries.iter().copied().collect();
    while let Some(name) = stack.pop() {
        if !reached.insert(name) {
            continue;
        }
        if let Some(rule) = rules.get(name) {
            stack.extend(rule.shape.refs());
        }
    }

    match rules.keys().find(|name| !reached.contains(*name)) {
        Some(name) => Err(CompositionError::UnreachableRule(name.to_string())),
        None => Ok(()),
    }
}

fn check_left_recursion<L: Language>(
    rules: &IndexMap<&'static str, Rule<L>>,
    analysis: &Analysis,
) -> Result<()> {
    let adj: IndexMap<&'static str, Vec<&'static str>> = rules
        .values()
        .map(|rule| {
            let mut out = Vec::new();
            analysis.left_refs::<L>(&rule.shape, &mut out);
            (rule.name, out)
        })
        .collect();

    let nodes: Vec<&'static str> = rules.keys().copied().collect();
    match CycleFinder::find(&nodes, &adj) {
        Some(chain) => Err(CompositionError::LeftRecursion {
            chain: chain.into_iter().map(str::to_string).collect(),
        }),
        None => Ok(()),
    }
}

/// Display names for every raw kind a shape mentions.
fn kind_names<L: Language>(rules: &IndexMap<&'static str, Rule<L>>) -> HashMap<u16, String> {
    let mut names = HashMap::new();
    for rule in rules.values() {
        for kind in rule.shape.tokens() {
            names
                .entry(L::kind_to_raw(kind))
                .or_insert_with(|| kind.to_string());
        }
    }
    names
}

/// DFS over "may call before consuming" edges. Returns the first cycle found as
/// the rule path from its start back to the start.
struct CycleFinder<'a> {
    adj: &'a IndexMap<&'static str, Vec<&'static str>>,
    visited: IndexSet<&'static str>,
    on_path: IndexMap<&'static str, usize>,
    path: Vec<&'static str>,
}

impl<'a> CycleFinder<'a> {
    fn find(
        nodes: &[&'static str],
        adj: &'a IndexMap<&'static str, Vec<&'static str>>,
    ) -> Option<Vec<&'static str>> {
        let mut finder = Self {
            adj,
            visited: IndexSet::new(),
            on_path: IndexMap::new(),
            path: Vec::new(),
        };

        for start in nodes {
            if let Some(chain) = finder.dfs(*start) {
                return Some(chain);
            }
        }
        None
    }

    fn dfs(&mut self, current: &'static str) -> Option<Vec<&'static str>> {
        if self.visited.contains(current) {
            return None;
        }

        self.visited.insert(current);
        self.on_path.insert(current, self.path.len());
        self.path.push(current);

        if let Some(neighbors) = self.adj.get(current) {
            for &target in neighbors {
                if let Some(&start_index) = self.on_path.get(target) {
                    let mut chain = self.path[start_index..].to_vec();
                    chain.push(target);
                    return Some(chain);
                }

                if let Some(chain) = self.dfs(target) {
                    return Some(chain);
                }
            }
        }

        self.path.pop();
        self.on_path.shift_remove(current);
        None
    }
}
