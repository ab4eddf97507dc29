//! Expressions, from `||` down to primary expressions.
//!
//! Every precedence level collapses to its operand when no operator follows, so
//! `?x` parses to a bare term rather than a tower of single-operand nodes.
//! Binary operators associate to the left.
//!
//! The lexer glues a sign to a following number, so `?a -1` arrives as a
//! variable and a negative literal. The additive level accepts such a literal in
//! operator position: `?a -1` becomes `?a - 1` and `?a +1` becomes `?a + +1`.

use spindle_core::shape::{alt, many, opt, rule, sep_by1, seq, tok};
use spindle_core::{Alt, Rule};

use super::{SparqlOps, SparqlRule, Step, into_expression, set};
use crate::Result;
use crate::SyntaxKind::{self, *};
use crate::ast::{Expression, Term};
use crate::value::ArgList;

const COMPARISONS: [SyntaxKind; 6] = [Eq, BangEq, Lt, Gt, LtEq, GtEq];
const SIGNED: [SyntaxKind; 6] = [
    IntegerPositive,
    DecimalPositive,
    DoublePositive,
    IntegerNegative,
    DecimalNegative,
    DoubleNegative,
];
const NEGATIVE: [SyntaxKind; 3] = [IntegerNegative, DecimalNegative, DoubleNegative];

pub fn expression_rules() -> Vec<SparqlRule> {
    let comparison = |kind| seq([tok(kind), rule("NumericExpression")]);
    let factor = |kind| seq([tok(kind), rule("UnaryExpression")]);

    vec![
        Rule::new("Expression", rule("ConditionalOrExpression"), expression),
        Rule::new(
            "ConditionalOrExpression",
            sep_by1(rule("ConditionalAndExpression"), PipePipe),
            conditional_or,
        ),
        Rule::new(
            "ConditionalAndExpression",
            sep_by1(rule("ValueLogical"), AmpAmp),
            conditional_and,
        ),
        Rule::new("ValueLogical", rule("RelationalExpression"), value_logical),
        Rule::new(
            "RelationalExpression",
            seq([
                rule("NumericExpression"),
                opt(alt(COMPARISONS
                    .iter()
                    .map(|&kind| comparison(kind))
                    .chain([
                        seq([tok(KwIn), rule("ExpressionList")]),
                        seq([tok(KwNot), tok(KwIn), rule("ExpressionList")]),
                    ]))),
            ]),
            relational,
        ),
        Rule::new(
            "NumericExpression",
            rule("AdditiveExpression"),
            numeric_expression,
        ),
        Rule::new(
            "AdditiveExpression",
            seq([
                rule("MultiplicativeExpression"),
                many(alt([
                    seq([tok(Plus), rule("MultiplicativeExpression")]),
                    seq([tok(Minus), rule("MultiplicativeExpression")]),
                    seq([
                        alt([
                            rule("NumericLiteralPositive"),
                            rule("NumericLiteralNegative"),
                        ]),
                        many(alt([factor(Star), factor(Slash)])),
                    ]),
                ])),
            ]),
            additive,
        ),
        Rule::new(
            "MultiplicativeExpression",
            seq([
                rule("UnaryExpression"),
                many(alt([factor(Star), factor(Slash)])),
            ]),
            multiplicative,
        ),
        Rule::new(
            "UnaryExpression",
            alt([
                seq([tok(Bang), rule("PrimaryExpression")]),
                seq([tok(Plus), rule("PrimaryExpression")]),
                seq([tok(Minus), rule("PrimaryExpression")]),
                rule("PrimaryExpression"),
            ]),
            unary,
        ),
        Rule::new(
            "PrimaryExpression",
            alt([
                rule("BrackettedExpression"),
                rule("BuiltInCall"),
                rule("iriOrFunction"),
                rule("RDFLiteral"),
                rule("NumericLiteral"),
                rule("BooleanLiteral"),
                rule("Var"),
            ]),
            primary,
        ),
        Rule::new(
            "BrackettedExpression",
            seq([tok(ParenOpen), rule("Expression"), tok(ParenClose)]),
            bracketted,
        ),
        Rule::new(
            "iriOrFunction",
            seq([rule("iri"), opt(rule("ArgList"))]),
            iri_or_function,
        ),
        Rule::new(
            "ArgList",
            alt([
                tok(Nil),
                seq([
                    tok(ParenOpen),
                    opt(tok(KwDistinct)),
                    sep_by1(rule("Expression"), Comma),
                    tok(ParenClose),
                ]),
            ]),
            arg_list,
        ),
        Rule::new(
            "ExpressionList",
            alt([
                tok(Nil),
                seq([
                    tok(ParenOpen),
                    sep_by1(rule("Expression"), Comma),
                    tok(ParenClose),
                ]),
            ]),
            expression_list,
        ),
    ]
}

fn sub_expression(ops: &mut SparqlOps<'_>, name: &'static str) -> Result<Expression> {
    ops.sub(name, &[])
}

fn fold_left(first: Expression, rest: Vec<(&'static str, Expression)>) -> Expression {
    rest.into_iter().fold(first, |lhs, (operator, rhs)| {
        Expression::operation(operator, vec![lhs, rhs])
    })
}

/// `operand (separator operand)*`, folded left under one operator.
fn chain(
    ops: &mut SparqlOps<'_>,
    operand: &'static str,
    separator: SyntaxKind,
    operator: &'static str,
) -> Step {
    let first = sub_expression(ops, operand)?;
    let rest = ops.many(separator, |ops| {
        ops.consume(separator)?;
        Ok((operator, sub_expression(ops, operand)?))
    })?;
    Ok(fold_left(first, rest).into())
}

fn expression(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.subrule("ConditionalOrExpression", &[])
}

fn conditional_or(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    chain(ops, "ConditionalAndExpression", PipePipe, "||")
}

fn conditional_and(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    chain(ops, "ValueLogical", AmpAmp, "&&")
}

fn value_logical(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.subrule("RelationalExpression", &[])
}

fn numeric_expression(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.subrule("AdditiveExpression", &[])
}

/// At most one comparison: `a = b = c` is a syntax error.
fn relational(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let lhs = sub_expression(ops, "NumericExpression")?;

    if ops.at(KwIn) || ops.at(KwNot) {
        let operator = if ops.eat(KwNot).is_some() { "notin" } else { "in" };
        ops.consume(KwIn)?;
        let list: Vec<Expression> = ops.sub("ExpressionList", &[])?;
        return Ok(Expression::operation(operator, vec![lhs, Expression::List(list)]).into());
    }

    if !ops.at_any(set(&COMPARISONS)) {
        return Ok(lhs.into());
    }
    let token = ops.consume_any(set(&COMPARISONS))?;
    let operator = match token.kind {
        Eq => "=",
        BangEq => "!=",
        Lt => "<",
        Gt => ">",
        LtEq => "<=",
        _ => ">=",
    };
    let rhs = sub_expression(ops, "NumericExpression")?;
    Ok(Expression::operation(operator, vec![lhs, rhs]).into())
}

fn additive(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let first = sub_expression(ops, "MultiplicativeExpression")?;
    let starts = set(&[Plus, Minus]).union(set(&SIGNED));
    let rest = ops.many(starts, |ops| {
        if ops.at_any(set(&SIGNED)) {
            return signed_tail(ops);
        }
        let operator = if ops.eat(Plus).is_some() {
            "+"
        } else {
            ops.consume(Minus)?;
            "-"
        };
        Ok((operator, sub_expression(ops, "MultiplicativeExpression")?))
    })?;
    Ok(fold_left(first, rest).into())
}

/// A signed literal in operator position, plus any `*` / `/` factors that bind
/// tighter than the implied `+` or `-`.
fn signed_tail(ops: &mut SparqlOps<'_>) -> Result<(&'static str, Expression)> {
    let negative = ops.at_any(set(&NEGATIVE));
    let (operator, literal) = if negative {
        let literal: Term = ops.sub("NumericLiteralNegative", &[])?;
        ("-", strip_sign(literal))
    } else {
        let literal: Term = ops.sub("NumericLiteralPositive", &[])?;
        ("+", literal)
    };
    let factors = multiplicative_tail(ops)?;
    Ok((operator, fold_left(Expression::Term(literal), factors)))
}

fn strip_sign(mut term: Term) -> Term {
    if let Term::Literal(literal) = &mut term
        && let Some(unsigned) = literal.value.strip_prefix('-')
    {
        literal.value = unsigned.to_string();
    }
    term
}

fn multiplicative_tail(ops: &mut SparqlOps<'_>) -> Result<Vec<(&'static str, Expression)>> {
    ops.many(set(&[Star, Slash]), |ops| {
        let operator = if ops.eat(Star).is_some() {
            "*"
        } else {
            ops.consume(Slash)?;
            "/"
        };
        Ok((operator, sub_expression(ops, "UnaryExpression")?))
    })
}

fn multiplicative(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let first = sub_expression(ops, "UnaryExpression")?;
    let rest = multiplicative_tail(ops)?;
    Ok(fold_left(first, rest).into())
}

fn unary(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let operator = match ops.peek() {
        Bang => "!",
        Plus => "UPLUS",
        Minus => "UMINUS",
        _ => return ops.subrule("PrimaryExpression", &[]),
    };
    ops.consume(ops.peek())?;
    let operand = sub_expression(ops, "PrimaryExpression")?;
    Ok(Expression::operation(operator, vec![operand]).into())
}

fn primary(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let value = ops.alternate(&[
        Alt::rule("BrackettedExpression"),
        Alt::rule("BuiltInCall"),
        Alt::rule("iriOrFunction"),
        Alt::rule("RDFLiteral"),
        Alt::rule("NumericLiteral"),
        Alt::rule("BooleanLiteral"),
        Alt::rule("Var"),
    ])?;
    Ok(into_expression(value)?.into())
}

fn bracketted(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(ParenOpen)?;
    let inner = ops.subrule("Expression", &[])?;
    ops.consume(ParenClose)?;
    Ok(inner)
}

fn iri_or_function(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let iri: String = ops.sub("iri", &[])?;
    let args = ops.option(set(&[Nil, ParenOpen]), |ops| ops.sub::<ArgList>("ArgList", &[]))?;
    let expression = match args {
        Some(ArgList { distinct, args }) => Expression::FunctionCall {
            function: iri,
            distinct,
            args,
        },
        None => Expression::Term(ops.context().factory.named_node(&iri)),
    };
    Ok(expression.into())
}

fn arg_list(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    if ops.at(Nil) {
        ops.consume(Nil)?;
        return Ok(ArgList {
            distinct: false,
            args: Vec::new(),
        }
        .into());
    }
    ops.consume(ParenOpen)?;
    let distinct = ops.eat(KwDistinct).is_some();
    let args = ops.at_least_one_sep(Comma, |ops| sub_expression(ops, "Expression"))?;
    ops.consume(ParenClose)?;
    Ok(ArgList { distinct, args }.into())
}

fn expression_list(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    if ops.at(Nil) {
        ops.consume(Nil)?;
        return Ok(Vec::<Expression>::new().into());
    }
    ops.consume(ParenOpen)?;
    let items = ops.at_least_one_sep(Comma, |ops| sub_expression(ops, "Expression"))?;
    ops.consume(ParenClose)?;
    Ok(items.into())
}
