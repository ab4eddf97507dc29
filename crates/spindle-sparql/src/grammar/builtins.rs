//! Built-in function calls, aggregates and `EXISTS`.
//!
//! Most built-ins differ only in keyword and arity, so they are generated from a
//! table of templates. Each becomes its own rule; `BuiltInCall` dispatches over
//! a list of rule names, which is what lets a dialect add a built-in by patching
//! the dispatcher alone.

use spindle_core::shape::{Shape, alt, many, opt, rule, seq, tok};
use spindle_core::{Alt, Rule};

use super::{SparqlOps, SparqlRule, Step, set, with_mode};
use crate::SyntaxKind::{self, *};
use crate::ast::{Aggregate, Expression, Pattern, Term};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::{Result, Sparql};

/// Argument shape of a table-driven built-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Template {
    /// `KW()`
    Nil,
    /// `KW(e1, ..., en)` with `min <= n <= max`.
    Exprs { min: usize, max: usize },
    /// `KW(?var)`
    Var,
    /// `KW(e)` or `KW()`
    ExprOrNil,
    /// `KW` followed by an expression list, possibly empty.
    List,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct BuiltIn {
    pub(crate) rule: &'static str,
    pub(crate) keyword: SyntaxKind,
    /// Lowercase keyword, stored as the operator of the resulting operation.
    pub(crate) operator: &'static str,
    pub(crate) template: Template,
}

const fn builtin(
    rule: &'static str,
    keyword: SyntaxKind,
    operator: &'static str,
    template: Template,
) -> BuiltIn {
    BuiltIn {
        rule,
        keyword,
        operator,
        template,
    }
}

const fn exprs(n: usize) -> Template {
    Template::Exprs { min: n, max: n }
}

const ONE: Template = exprs(1);
const TWO: Template = exprs(2);

#[rustfmt::skip]
const BUILT_INS: &[BuiltIn] = &[
    builtin("BuiltInStr", KwStr, "str", ONE),
    builtin("BuiltInLang", KwLang, "lang", ONE),
    builtin("BuiltInLangMatches", KwLangMatches, "langmatches", TWO),
    builtin("BuiltInDatatype", KwDatatype, "datatype", ONE),
    builtin("BuiltInBound", KwBound, "bound", Template::Var),
    builtin("BuiltInIri", KwIri, "iri", ONE),
    builtin("BuiltInUri", KwUri, "uri", ONE),
    builtin("BuiltInBnode", KwBnode, "bnode", Template::ExprOrNil),
    builtin("BuiltInRand", KwRand, "rand", Template::Nil),
    builtin("BuiltInAbs", KwAbs, "abs", ONE),
    builtin("BuiltInCeil", KwCeil, "ceil", ONE),
    builtin("BuiltInFloor", KwFloor, "floor", ONE),
    builtin("BuiltInRound", KwRound, "round", ONE),
    builtin("BuiltInConcat", KwConcat, "concat", Template::List),
    builtin("SubstringExpression", KwSubstr, "substr", Template::Exprs { min: 2, max: 3 }),
    builtin("BuiltInStrLen", KwStrLen, "strlen", ONE),
    builtin("StrReplaceExpression", KwReplace, "replace", Template::Exprs { min: 3, max: 4 }),
    builtin("BuiltInUcase", KwUcase, "ucase", ONE),
    builtin("BuiltInLcase", KwLcase, "lcase", ONE),
    builtin("BuiltInEncodeForUri", KwEncodeForUri, "encode_for_uri", ONE),
    builtin("BuiltInContains", KwContains, "contains", TWO),
    builtin("BuiltInStrStarts", KwStrStarts, "strstarts", TWO),
    builtin("BuiltInStrEnds", KwStrEnds, "strends", TWO),
    builtin("BuiltInStrBefore", KwStrBefore, "strbefore", TWO),
    builtin("BuiltInStrAfter", KwStrAfter, "strafter", TWO),
    builtin("BuiltInYear", KwYear, "year", ONE),
    builtin("BuiltInMonth", KwMonth, "month", ONE),
    builtin("BuiltInDay", KwDay, "day", ONE),
    builtin("BuiltInHours", KwHours, "hours", ONE),
    builtin("BuiltInMinutes", KwMinutes, "minutes", ONE),
    builtin("BuiltInSeconds", KwSeconds, "seconds", ONE),
    builtin("BuiltInTimezone", KwTimezone, "timezone", ONE),
    builtin("BuiltInTz", KwTz, "tz", ONE),
    builtin("BuiltInNow", KwNow, "now", Template::Nil),
    builtin("BuiltInUuid", KwUuid, "uuid", Template::Nil),
    builtin("BuiltInStrUuid", KwStrUuid, "struuid", Template::Nil),
    builtin("BuiltInMd5", KwMd5, "md5", ONE),
    builtin("BuiltInSha1", KwSha1, "sha1", ONE),
    builtin("BuiltInSha256", KwSha256, "sha256", ONE),
    builtin("BuiltInSha384", KwSha384, "sha384", ONE),
    builtin("BuiltInSha512", KwSha512, "sha512", ONE),
    builtin("BuiltInCoalesce", KwCoalesce, "coalesce", Template::List),
    builtin("BuiltInIf", KwIf, "if", exprs(3)),
    builtin("BuiltInStrLang", KwStrLang, "strlang", TWO),
    builtin("BuiltInStrDt", KwStrDt, "strdt", TWO),
    builtin("BuiltInSameTerm", KwSameTerm, "sameterm", TWO),
    builtin("BuiltInIsIri", KwIsIri, "isiri", ONE),
    builtin("BuiltInIsUri", KwIsUri, "isuri", ONE),
    builtin("BuiltInIsBlank", KwIsBlank, "isblank", ONE),
    builtin("BuiltInIsLiteral", KwIsLiteral, "isliteral", ONE),
    builtin("BuiltInIsNumeric", KwIsNumeric, "isnumeric", ONE),
    builtin("RegexExpression", KwRegex, "regex", Template::Exprs { min: 2, max: 3 }),
];

const AGGREGATES: [SyntaxKind; 7] = [
    KwCount,
    KwSum,
    KwMin,
    KwMax,
    KwAvg,
    KwSample,
    KwGroupConcat,
];

/// Rule names `BuiltInCall` dispatches to in the full grammar.
pub fn builtin_call_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = BUILT_INS.iter().map(|b| b.rule).collect();
    names.extend(["Aggregate", "ExistsFunc", "NotExistsFunc"]);
    names
}

pub fn builtin_rules() -> Vec<SparqlRule> {
    let mut rules: Vec<SparqlRule> = BUILT_INS.iter().map(|&b| builtin_rule(b)).collect();
    rules.push(Rule::new("Aggregate", aggregate_shape(), aggregate));
    rules.push(Rule::new(
        "ExistsFunc",
        seq([tok(KwExists), rule("GroupGraphPattern")]),
        exists,
    ));
    rules.push(Rule::new(
        "NotExistsFunc",
        seq([tok(KwNot), tok(KwExists), rule("GroupGraphPattern")]),
        not_exists,
    ));
    rules.push(builtin_call(builtin_call_names()));
    rules
}

/// `BuiltInCall` as an ordered choice over `names`.
pub fn builtin_call(names: Vec<&'static str>) -> SparqlRule {
    let shape = alt(names.iter().map(|&name| rule(name)));
    Rule::new(
        "BuiltInCall",
        shape,
        move |ops: &mut SparqlOps<'_>, _: &[bool]| {
            let alts: Vec<Alt<'_, Sparql>> = names.iter().map(|&name| Alt::rule(name)).collect();
            ops.alternate(&alts)
        },
    )
}

pub(crate) fn builtin_rule(def: BuiltIn) -> SparqlRule {
    Rule::new(
        def.rule,
        template_shape(def.keyword, def.template),
        move |ops: &mut SparqlOps<'_>, _: &[bool]| call(ops, def),
    )
}

fn template_shape(keyword: SyntaxKind, template: Template) -> Shape<SyntaxKind> {
    let body = match template {
        Template::Nil => tok(Nil),
        Template::Exprs { max, .. } if max > 1 => seq([
            tok(ParenOpen),
            rule("Expression"),
            many(seq([tok(Comma), rule("Expression")])),
            tok(ParenClose),
        ]),
        Template::Exprs { .. } => seq([tok(ParenOpen), rule("Expression"), tok(ParenClose)]),
        Template::Var => seq([tok(ParenOpen), rule("Var"), tok(ParenClose)]),
        Template::ExprOrNil => alt([
            seq([tok(ParenOpen), rule("Expression"), tok(ParenClose)]),
            tok(Nil),
        ]),
        Template::List => rule("ExpressionList"),
    };
    seq([tok(keyword), body])
}

fn call(ops: &mut SparqlOps<'_>, def: BuiltIn) -> Step {
    ops.consume(def.keyword)?;
    let args = match def.template {
        Template::Nil => {
            ops.consume(Nil)?;
            Vec::new()
        }
        Template::Exprs { min, max } => {
            ops.consume(ParenOpen)?;
            let mut args = vec![ops.sub::<Expression>("Expression", &[])?];
            while args.len() < max {
                if args.len() >= min && !ops.at(Comma) {
                    break;
                }
                ops.consume(Comma)?;
                args.push(ops.sub("Expression", &[])?);
            }
            ops.consume(ParenClose)?;
            args
        }
        Template::Var => {
            ops.consume(ParenOpen)?;
            let var: Term = ops.sub("Var", &[])?;
            ops.consume(ParenClose)?;
            vec![Expression::Term(var)]
        }
        Template::ExprOrNil => {
            if ops.eat(Nil).is_some() {
                Vec::new()
            } else {
                ops.consume(ParenOpen)?;
                let arg: Expression = ops.sub("Expression", &[])?;
                ops.consume(ParenClose)?;
                vec![arg]
            }
        }
        Template::List => ops.sub("ExpressionList", &[])?,
    };
    Ok(Expression::operation(def.operator, args).into())
}

fn aggregate_shape() -> Shape<SyntaxKind> {
    let open = || [tok(ParenOpen), opt(tok(KwDistinct))];
    let simple = |keyword| {
        seq([tok(keyword)]
            .into_iter()
            .chain(open())
            .chain([rule("Expression"), tok(ParenClose)]))
    };

    alt([
        seq([tok(KwCount)]
            .into_iter()
            .chain(open())
            .chain([alt([tok(Star), rule("Expression")]), tok(ParenClose)])),
        simple(KwSum),
        simple(KwMin),
        simple(KwMax),
        simple(KwAvg),
        simple(KwSample),
        seq([tok(KwGroupConcat)].into_iter().chain(open()).chain([
            rule("Expression"),
            opt(seq([
                tok(Semicolon),
                tok(KwSeparator),
                tok(Eq),
                rule("String"),
            ])),
            tok(ParenClose),
        ])),
    ])
}

fn aggregate_name(keyword: SyntaxKind) -> &'static str {
    match keyword {
        KwCount => "count",
        KwSum => "sum",
        KwMin => "min",
        KwMax => "max",
        KwAvg => "avg",
        KwSample => "sample",
        _ => "group_concat",
    }
}

fn aggregate(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let keyword = ops.consume_any(set(&AGGREGATES))?;
    let mode = ops.context().mode;
    if mode.in_aggregate {
        return Err(Diagnostic::new(DiagnosticKind::NestedAggregate, keyword.span).into());
    }
    if !mode.aggregates_allowed {
        return Err(Diagnostic::new(DiagnosticKind::AggregateNotAllowed, keyword.span).into());
    }

    ops.consume(ParenOpen)?;
    let distinct = ops.eat(KwDistinct).is_some();
    let (expression, separator) = with_mode(
        ops,
        |mode| mode.in_aggregate = true,
        |ops| aggregate_argument(ops, keyword.kind),
    )?;
    ops.consume(ParenClose)?;

    Ok(Expression::Aggregate(Aggregate {
        name: aggregate_name(keyword.kind),
        distinct,
        expression: Box::new(expression),
        separator,
    })
    .into())
}

fn aggregate_argument(
    ops: &mut SparqlOps<'_>,
    keyword: SyntaxKind,
) -> Result<(Expression, Option<String>)> {
    if keyword == KwCount && ops.at(Star) {
        ops.consume(Star)?;
        return Ok((Expression::Wildcard, None));
    }
    let expression: Expression = ops.sub("Expression", &[])?;
    if keyword != KwGroupConcat || !ops.at(Semicolon) {
        return Ok((expression, None));
    }
    ops.consume(Semicolon)?;
    ops.consume(KwSeparator)?;
    ops.consume(Eq)?;
    let separator: String = ops.sub("String", &[])?;
    Ok((expression, Some(separator)))
}

fn exists_pattern(ops: &mut SparqlOps<'_>) -> Result<Expression> {
    ops.consume(KwExists)?;
    let patterns: Vec<Pattern> = ops.sub("GroupGraphPattern", &[])?;
    Ok(Expression::Pattern(Box::new(Pattern::Group { patterns })))
}

fn exists(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let pattern = exists_pattern(ops)?;
    Ok(Expression::operation("exists", vec![pattern]).into())
}

fn not_exists(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwNot)?;
    let pattern = exists_pattern(ops)?;
    Ok(Expression::operation("notexists", vec![pattern]).into())
}
