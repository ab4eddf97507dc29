//! Group graph patterns and everything that can appear inside one.

use indexmap::IndexSet;
use rowan::TextRange;
use spindle_core::shape::{alt, many, opt, rule, seq, tok};
use spindle_core::{Alt, Lookahead, Rule};

use super::{SparqlOps, SparqlRule, Step, into_expression, into_term, set, with_mode};
use crate::Result;
use crate::SyntaxKind::*;
use crate::ast::{Expression, Pattern, Query, Term, Triple, ValuesBlock};
use crate::context::ParseMode;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::value::ArgList;

pub fn pattern_rules() -> Vec<SparqlRule> {
    vec![
        Rule::new(
            "GroupGraphPattern",
            seq([
                tok(BraceOpen),
                alt([rule("SubSelect"), rule("GroupGraphPatternSub")]),
                tok(BraceClose),
            ]),
            group_graph_pattern,
        ),
        Rule::new(
            "GroupGraphPatternSub",
            seq([
                opt(rule("TriplesBlock")),
                many(seq([
                    rule("GraphPatternNotTriples"),
                    opt(tok(Dot)),
                    opt(rule("TriplesBlock")),
                ])),
            ]),
            group_graph_pattern_sub,
        ),
        Rule::new(
            "TriplesBlock",
            seq([
                rule("TriplesSameSubject"),
                many(seq([tok(Dot), opt(rule("TriplesSameSubject"))])),
            ]),
            triples_block,
        ),
        Rule::new(
            "GraphPatternNotTriples",
            alt([
                rule("GroupOrUnionGraphPattern"),
                rule("OptionalGraphPattern"),
                rule("MinusGraphPattern"),
                rule("GraphGraphPattern"),
                rule("ServiceGraphPattern"),
                rule("Filter"),
                rule("Bind"),
                rule("InlineData"),
            ]),
            graph_pattern_not_triples,
        ),
        Rule::new(
            "GroupOrUnionGraphPattern",
            seq([
                rule("GroupGraphPattern"),
                many(seq([tok(KwUnion), rule("GroupGraphPattern")])),
            ]),
            group_or_union,
        ),
        Rule::new(
            "OptionalGraphPattern",
            seq([tok(KwOptional), rule("GroupGraphPattern")]),
            |ops: &mut SparqlOps<'_>, _: &[bool]| {
                ops.consume(KwOptional)?;
                let patterns = ops.sub("GroupGraphPattern", &[])?;
                Ok(Pattern::Optional { patterns }.into())
            },
        ),
        Rule::new(
            "MinusGraphPattern",
            seq([tok(KwMinus), rule("GroupGraphPattern")]),
            |ops: &mut SparqlOps<'_>, _: &[bool]| {
                ops.consume(KwMinus)?;
                let patterns = ops.sub("GroupGraphPattern", &[])?;
                Ok(Pattern::Minus { patterns }.into())
            },
        ),
        Rule::new(
            "GraphGraphPattern",
            seq([tok(KwGraph), rule("VarOrIri"), rule("GroupGraphPattern")]),
            graph_graph_pattern,
        ),
        Rule::new(
            "ServiceGraphPattern",
            seq([
                tok(KwService),
                opt(tok(KwSilent)),
                rule("VarOrIri"),
                rule("GroupGraphPattern"),
            ]),
            service_graph_pattern,
        ),
        Rule::new("Filter", seq([tok(KwFilter), rule("Constraint")]), filter),
        Rule::new(
            "Constraint",
            alt([
                rule("BrackettedExpression"),
                rule("BuiltInCall"),
                rule("FunctionCall"),
            ]),
            constraint,
        ),
        Rule::new(
            "FunctionCall",
            seq([rule("iri"), rule("ArgList")]),
            function_call,
        ),
        Rule::new(
            "Bind",
            seq([
                tok(KwBind),
                tok(ParenOpen),
                rule("Expression"),
                tok(KwAs),
                rule("Var"),
                tok(ParenClose),
            ]),
            bind,
        ),
        Rule::new("InlineData", seq([tok(KwValues), rule("DataBlock")]), inline_data),
        Rule::new(
            "DataBlock",
            alt([rule("InlineDataOneVar"), rule("InlineDataFull")]),
            |ops: &mut SparqlOps<'_>, _: &[bool]| {
                ops.alternate(&[Alt::rule("InlineDataOneVar"), Alt::rule("InlineDataFull")])
            },
        ),
        Rule::new(
            "InlineDataOneVar",
            seq([
                rule("Var"),
                tok(BraceOpen),
                many(rule("DataBlockValue")),
                tok(BraceClose),
            ]),
            inline_data_one_var,
        ),
        Rule::new(
            "InlineDataFull",
            seq([
                alt([
                    tok(Nil),
                    seq([tok(ParenOpen), many(rule("Var")), tok(ParenClose)]),
                ]),
                tok(BraceOpen),
                many(alt([
                    seq([tok(ParenOpen), many(rule("DataBlockValue")), tok(ParenClose)]),
                    tok(Nil),
                ])),
                tok(BraceClose),
            ]),
            inline_data_full,
        ),
        Rule::new(
            "DataBlockValue",
            alt([
                rule("iri"),
                rule("RDFLiteral"),
                rule("NumericLiteral"),
                rule("BooleanLiteral"),
                tok(KwUndef),
            ]),
            data_block_value,
        ),
    ]
}

/// `{ ... }` opens a fresh scope for blank node labels and resets the parse
/// mode; aggregates inside a nested group are only allowed again by a
/// sub-select's own projection.
fn group_graph_pattern(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(BraceOpen)?;
    let patterns = with_mode(
        ops,
        |mode| *mode = ParseMode::default(),
        |ops| {
            ops.action(|ctx| ctx.enter_label_scope());
            let patterns = if ops.at(KwSelect) {
                let query: Query = ops.sub("SubSelect", &[])?;
                vec![Pattern::SubQuery {
                    query: Box::new(query),
                }]
            } else {
                ops.sub::<Vec<Pattern>>("GroupGraphPatternSub", &[])?
            };
            ops.action(|ctx| ctx.exit_label_scope());
            Ok(patterns)
        },
    )?;
    ops.consume(BraceClose)?;
    Ok(patterns.into())
}

fn group_graph_pattern_sub(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let mut patterns = Vec::new();
    push_triples_block(ops, &mut patterns)?;

    ops.many(Lookahead::Rule("GraphPatternNotTriples"), |ops| {
        let start = ops.mark();
        let pattern: Pattern = ops.sub("GraphPatternNotTriples", &[])?;
        if let Pattern::Bind { variable, .. } = &pattern {
            check_fresh_binding(&patterns, variable, ops.span_from(start))?;
        }
        patterns.push(pattern);
        ops.eat(Dot);
        push_triples_block(ops, &mut patterns)
    })?;

    Ok(patterns.into())
}

fn push_triples_block(ops: &mut SparqlOps<'_>, patterns: &mut Vec<Pattern>) -> Result<()> {
    if ops.starts("TriplesBlock") {
        let triples = ops.sub("TriplesBlock", &[])?;
        patterns.push(Pattern::Bgp { triples });
    }
    Ok(())
}

/// `BIND` may not target a variable already in scope in its group.
fn check_fresh_binding(preceding: &[Pattern], variable: &Term, range: TextRange) -> Result<()> {
    let Some(name) = variable.as_variable() else {
        return Ok(());
    };
    let mut in_scope = IndexSet::new();
    for pattern in preceding {
        pattern.in_scope_variables(&mut in_scope);
    }
    if in_scope.contains(name) {
        return Err(Diagnostic::new(DiagnosticKind::VariableAlreadyBound, range)
            .message(format!("?{}", name))
            .into());
    }
    Ok(())
}

fn triples_block(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let mut triples: Vec<Triple> = ops.sub("TriplesSameSubject", &[true])?;
    ops.many(Dot, |ops| {
        ops.consume(Dot)?;
        if ops.starts("TriplesSameSubject") {
            triples.extend(ops.sub::<Vec<Triple>>("TriplesSameSubject", &[true])?);
        }
        Ok(())
    })?;
    Ok(triples.into())
}

fn graph_pattern_not_triples(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.alternate(&[
        Alt::rule("GroupOrUnionGraphPattern"),
        Alt::rule("OptionalGraphPattern"),
        Alt::rule("MinusGraphPattern"),
        Alt::rule("GraphGraphPattern"),
        Alt::rule("ServiceGraphPattern"),
        Alt::rule("Filter"),
        Alt::rule("Bind"),
        Alt::rule("InlineData"),
    ])
}

fn group_or_union(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let mut groups = ops.at_least_one_sep(KwUnion, |ops| {
        ops.sub::<Vec<Pattern>>("GroupGraphPattern", &[])
    })?;
    if groups.len() == 1 {
        let patterns = groups.remove(0);
        return Ok(Pattern::Group { patterns }.into());
    }
    let patterns = groups
        .into_iter()
        .map(|patterns| Pattern::Group { patterns })
        .collect();
    Ok(Pattern::Union { patterns }.into())
}

fn graph_graph_pattern(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwGraph)?;
    let name: Term = ops.sub("VarOrIri", &[])?;
    let patterns = ops.sub("GroupGraphPattern", &[])?;
    Ok(Pattern::Graph { name, patterns }.into())
}

fn service_graph_pattern(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwService)?;
    let silent = ops.eat(KwSilent).is_some();
    let name: Term = ops.sub("VarOrIri", &[])?;
    let patterns = ops.sub("GroupGraphPattern", &[])?;
    Ok(Pattern::Service {
        name,
        silent,
        patterns,
    }
    .into())
}

fn filter(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwFilter)?;
    let expression: Expression = ops.sub("Constraint", &[])?;
    Ok(Pattern::Filter { expression }.into())
}

fn constraint(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let value = ops.alternate(&[
        Alt::rule("BrackettedExpression"),
        Alt::rule("BuiltInCall"),
        Alt::rule("FunctionCall"),
    ])?;
    Ok(into_expression(value)?.into())
}

fn function_call(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let function: String = ops.sub("iri", &[])?;
    let ArgList { distinct, args } = ops.sub("ArgList", &[])?;
    Ok(Expression::FunctionCall {
        function,
        distinct,
        args,
    }
    .into())
}

fn bind(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwBind)?;
    ops.consume(ParenOpen)?;
    let expression: Expression = ops.sub("Expression", &[])?;
    ops.consume(KwAs)?;
    let variable: Term = ops.sub("Var", &[])?;
    ops.consume(ParenClose)?;
    Ok(Pattern::Bind {
        variable,
        expression,
    }
    .into())
}

fn inline_data(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwValues)?;
    let values: ValuesBlock = ops.sub("DataBlock", &[])?;
    Ok(Pattern::Values { values }.into())
}

fn inline_data_one_var(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let variable: Term = ops.sub("Var", &[])?;
    ops.consume(BraceOpen)?;
    let rows = ops.many(Lookahead::Rule("DataBlockValue"), |ops| {
        Ok(vec![ops.sub::<Option<Term>>("DataBlockValue", &[])?])
    })?;
    ops.consume(BraceClose)?;
    Ok(ValuesBlock {
        variables: vec![variable],
        rows,
    }
    .into())
}

fn inline_data_full(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let variables = if ops.eat(Nil).is_some() {
        Vec::new()
    } else {
        ops.consume(ParenOpen)?;
        let variables = ops.many(Lookahead::Rule("Var"), |ops| ops.sub::<Term>("Var", &[]))?;
        ops.consume(ParenClose)?;
        variables
    };

    ops.consume(BraceOpen)?;
    let rows = ops.many(set(&[ParenOpen, Nil]), |ops| {
        let start = ops.mark();
        let row = if ops.eat(Nil).is_some() {
            Vec::new()
        } else {
            ops.consume(ParenOpen)?;
            let row = ops.many(Lookahead::Rule("DataBlockValue"), |ops| {
                ops.sub::<Option<Term>>("DataBlockValue", &[])
            })?;
            ops.consume(ParenClose)?;
            row
        };
        if row.len() != variables.len() {
            return Err(arity_mismatch(row.len(), variables.len(), ops.span_from(start)));
        }
        Ok(row)
    })?;
    ops.consume(BraceClose)?;

    Ok(ValuesBlock { variables, rows }.into())
}

fn arity_mismatch(found: usize, expected: usize, range: TextRange) -> crate::Error {
    let values = if found == 1 { "value" } else { "values" };
    let variables = if expected == 1 { "variable" } else { "variables" };
    Diagnostic::new(DiagnosticKind::ValuesArityMismatch, range)
        .message(format!(
            "{} {}, expected {} {}",
            found, values, expected, variables
        ))
        .into()
}

fn data_block_value(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    if ops.eat(KwUndef).is_some() {
        return Ok(Option::<Term>::None.into());
    }
    let value = ops.alternate(&[
        Alt::rule("iri"),
        Alt::rule("RDFLiteral"),
        Alt::rule("NumericLiteral"),
        Alt::rule("BooleanLiteral"),
    ])?;
    Ok(Some(into_term(ops, value)?).into())
}
