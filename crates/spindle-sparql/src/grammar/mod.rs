//! SPARQL 1.1 grammar as composable rule fragments.
//!
//! Each submodule contributes a fragment: a `Vec<Rule<Sparql>>` that is not a
//! grammar on its own. Compositions assemble fragments into registries, declare
//! entry rules, and link them into parsers:
//!
//! - [`sparql_1_1`]: queries and updates (`QueryUnit`, `UpdateUnit`)
//! - [`expression_only`]: a single expression; no graph patterns, so no `EXISTS`
//! - [`path_only`]: a single property path
//! - [`adjust`]: the full grammar plus the `ADJUST` built-in

mod adjust;
mod builtins;
mod expressions;
mod paths;
mod patterns;
mod query;
mod terms;
mod triples;
mod update;

#[cfg(test)]
mod adjust_tests;
#[cfg(test)]
mod expressions_tests;
#[cfg(test)]
mod paths_tests;
#[cfg(test)]
mod patterns_tests;
#[cfg(test)]
mod query_tests;
#[cfg(test)]
mod registry_tests;
#[cfg(test)]
mod triples_tests;
#[cfg(test)]
mod update_tests;

use std::sync::Arc;

use spindle_core::{CompositionError, EngineError, Ops, Parser, ParserConfig, Registry, Rule, TokenSet};

use crate::ast::{Expression, Term};
use crate::context::{ParseContext, ParseMode};
use crate::terms::DefaultTermFactory;
use crate::value::Value;
use crate::{Result, Sparql, SyntaxKind};

pub use adjust::adjust_rules;
pub use builtins::{builtin_call, builtin_call_names, builtin_rules};
pub use expressions::expression_rules;
pub use paths::path_rules;
pub use patterns::pattern_rules;
pub use query::query_rules;
pub use terms::{iri_rules, node_rules, term_rules};
pub use triples::triple_rules;
pub use update::update_rules;

pub(crate) type SparqlOps<'a> = Ops<'a, Sparql>;
pub(crate) type SparqlRule = Rule<Sparql>;
pub(crate) type Step = Result<Value>;

pub(crate) fn set(kinds: &[SyntaxKind]) -> TokenSet {
    TokenSet::of::<Sparql>(kinds)
}

/// Every rule used by queries and updates.
pub fn sparql_1_1() -> std::result::Result<Registry<Sparql>, CompositionError> {
    Registry::create(iri_rules())?
        .add_many(term_rules())?
        .add_many(node_rules())?
        .add_many(path_rules())?
        .add_many(expression_rules())?
        .add_many(builtin_rules())?
        .add_many(pattern_rules())?
        .add_many(triple_rules())?
        .add_many(query_rules())?
        .add_many(update_rules())?
        .entries(&["QueryUnit", "UpdateUnit"])
}

/// Expressions without graph patterns. `EXISTS` is removed, and the built-in
/// dispatcher is patched to stop offering it.
pub fn expression_only() -> std::result::Result<Registry<Sparql>, CompositionError> {
    let names: Vec<&'static str> = builtin_call_names()
        .into_iter()
        .filter(|name| !matches!(*name, "ExistsFunc" | "NotExistsFunc"))
        .collect();

    Registry::create(iri_rules())?
        .add_many(term_rules())?
        .add_many(expression_rules())?
        .add_many(builtin_rules())?
        .delete("ExistsFunc")?
        .delete("NotExistsFunc")?
        .patch(builtin_call(names))?
        .entries(&["Expression"])
}

pub fn path_only() -> std::result::Result<Registry<Sparql>, CompositionError> {
    Registry::create(iri_rules())?
        .add_many(path_rules())?
        .entries(&["Path"])
}

/// Full grammar merged with the `ADJUST` fragment. Both sides define
/// `BuiltInCall`, so the merge needs an override that dispatches to either.
pub fn adjust() -> std::result::Result<Registry<Sparql>, CompositionError> {
    let mut names = builtin_call_names();
    names.push("BuiltInAdjust");

    sparql_1_1()?.merge(Registry::create(adjust_rules())?, [builtin_call(names)])
}

/// Links a composed registry. Contexts created by the parser itself use the
/// default term factory; [`crate::SparqlParser`] supplies its own.
pub fn link(
    registry: Registry<Sparql>,
    config: ParserConfig,
) -> std::result::Result<Parser<Sparql>, CompositionError> {
    registry.consume_to_parser_with(SyntaxKind::vocabulary(), default_context, config)
}

fn default_context() -> ParseContext {
    ParseContext::new(Arc::new(DefaultTermFactory::new()))
}

/// Converts a value produced by an `alternate` into the type the caller needs.
pub(crate) fn expect<T: TryFrom<Value>>(rule: &str, value: Value) -> Result<T> {
    T::try_from(value).map_err(|_| {
        EngineError::ValueMismatch {
            rule: rule.to_string(),
            expected: std::any::type_name::<T>(),
        }
        .into()
    })
}

/// `iri` produces a plain string; term-producing rules produce terms.
pub(crate) fn into_term(ops: &SparqlOps<'_>, value: Value) -> Result<Term> {
    match value {
        Value::Str(iri) => Ok(ops.context().factory.named_node(&iri)),
        other => expect("term", other),
    }
}

pub(crate) fn into_expression(value: Value) -> Result<Expression> {
    match value {
        Value::Term(term) => Ok(Expression::Term(term)),
        other => expect("expression", other),
    }
}

/// Runs `f` under a modified parse mode and restores the previous mode, also
/// when `f` fails.
pub(crate) fn with_mode<'a, T>(
    ops: &mut Ops<'a, Sparql>,
    update: impl FnOnce(&mut ParseMode),
    f: impl FnOnce(&mut Ops<'a, Sparql>) -> Result<T>,
) -> Result<T> {
    let saved = ops.action(|ctx| {
        let saved = ctx.mode;
        update(&mut ctx.mode);
        saved
    });
    let result = f(ops);
    ops.action(|ctx| ctx.mode = saved);
    result
}

/// Positional argument 0 of triple rules: are property paths allowed?
pub(crate) fn allow_paths(args: &[bool]) -> bool {
    args.first().copied().unwrap_or(false)
}
