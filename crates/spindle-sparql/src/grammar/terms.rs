//! IRIs, literals, variables and blank nodes.

use rowan::TextRange;
use spindle_core::shape::{alt, opt, rule, seq, tok};
use spindle_core::{Alt, Lookahead, Rule};

use super::{SparqlOps, SparqlRule, Step, into_term, set};
use crate::Result;
use crate::SyntaxKind::{self, *};
use crate::ast::{RDF_NIL, RDF_TYPE, Term, XSD_BOOLEAN, XSD_DECIMAL, XSD_DOUBLE, XSD_INTEGER};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::terms::{unescape_local_name, unquote};

const STRINGS: [SyntaxKind; 4] = [
    StringLiteral1,
    StringLiteral2,
    StringLiteralLong1,
    StringLiteralLong2,
];
const UNSIGNED: [SyntaxKind; 3] = [Integer, Decimal, Double];
const POSITIVE: [SyntaxKind; 3] = [IntegerPositive, DecimalPositive, DoublePositive];
const NEGATIVE: [SyntaxKind; 3] = [IntegerNegative, DecimalNegative, DoubleNegative];

fn any_of(kinds: &[SyntaxKind]) -> spindle_core::Shape<SyntaxKind> {
    alt(kinds.iter().map(|&kind| tok(kind)))
}

/// `iri` and `PrefixedName`. Both produce the expanded IRI as a plain string.
pub fn iri_rules() -> Vec<SparqlRule> {
    vec![
        Rule::new("iri", alt([tok(IriRef), rule("PrefixedName")]), iri),
        Rule::new("PrefixedName", alt([tok(PnameLn), tok(PnameNs)]), prefixed_name),
    ]
}

pub fn term_rules() -> Vec<SparqlRule> {
    vec![
        Rule::new(
            "RDFLiteral",
            seq([
                rule("String"),
                opt(alt([tok(LangTag), seq([tok(CaretCaret), rule("iri")])])),
            ]),
            rdf_literal,
        ),
        Rule::new("String", any_of(&STRINGS), string),
        Rule::new(
            "NumericLiteral",
            alt([
                rule("NumericLiteralUnsigned"),
                rule("NumericLiteralPositive"),
                rule("NumericLiteralNegative"),
            ]),
            numeric_literal,
        ),
        Rule::new("NumericLiteralUnsigned", any_of(&UNSIGNED), unsigned),
        Rule::new("NumericLiteralPositive", any_of(&POSITIVE), positive),
        Rule::new("NumericLiteralNegative", any_of(&NEGATIVE), negative),
        Rule::new("BooleanLiteral", alt([tok(KwTrue), tok(KwFalse)]), boolean),
        Rule::new("Var", alt([tok(Var1), tok(Var2)]), var),
    ]
}

pub fn node_rules() -> Vec<SparqlRule> {
    vec![
        Rule::new("VarOrTerm", alt([rule("Var"), rule("GraphTerm")]), var_or_term),
        Rule::new("VarOrIri", alt([rule("Var"), rule("iri")]), var_or_iri),
        Rule::new(
            "GraphTerm",
            alt([
                rule("iri"),
                rule("RDFLiteral"),
                rule("NumericLiteral"),
                rule("BooleanLiteral"),
                rule("BlankNode"),
                tok(Nil),
            ]),
            graph_term,
        ),
        Rule::new("BlankNode", alt([tok(BlankNodeLabel), tok(Anon)]), blank_node),
    ]
}

fn iri(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    if ops.starts("PrefixedName") {
        return ops.subrule("PrefixedName", &[]);
    }
    if !ops.at(IriRef) {
        return Err(ops.expected(Lookahead::Rule("iri")));
    }
    let token = ops.consume(IriRef)?;
    let text = ops.text(&token);
    let iri = ops
        .context()
        .resolve_iri(&text[1..text.len() - 1], token.span)?;
    Ok(iri.into())
}

fn prefixed_name(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let token = ops.consume_any(set(&[PnameLn, PnameNs]))?;
    let text = ops.text(&token);
    let (prefix, local) = text.split_once(':').unwrap_or((text, ""));
    let iri = ops
        .context()
        .expand(prefix, &unescape_local_name(local), token.span)?;
    Ok(iri.into())
}

fn string(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let token = ops.consume_any(set(&STRINGS))?;
    let text = ops.text(&token);
    match unquote(text) {
        Some(value) => Ok(value.into()),
        None => Err(Diagnostic::new(DiagnosticKind::InvalidEscape, token.span)
            .message(text)
            .into()),
    }
}

fn rdf_literal(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let value: String = ops.sub("String", &[])?;
    let term = if let Some(tag) = ops.eat(LangTag) {
        let language = &ops.text(&tag)[1..];
        ops.context().factory.literal(&value, Some(language), None)
    } else if ops.eat(CaretCaret).is_some() {
        let datatype: String = ops.sub("iri", &[])?;
        ops.context().factory.literal(&value, None, Some(&datatype))
    } else {
        ops.context().factory.literal(&value, None, None)
    };
    Ok(term.into())
}

fn numeric_literal(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.alternate(&[
        Alt::rule("NumericLiteralUnsigned"),
        Alt::rule("NumericLiteralPositive"),
        Alt::rule("NumericLiteralNegative"),
    ])
}

fn unsigned(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    numeric(ops, &UNSIGNED)
}

fn positive(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    numeric(ops, &POSITIVE)
}

fn negative(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    numeric(ops, &NEGATIVE)
}

/// Numeric literals keep their lexical form, sign included.
fn numeric(ops: &mut SparqlOps<'_>, kinds: &[SyntaxKind]) -> Step {
    let token = ops.consume_any(set(kinds))?;
    let datatype = match token.kind {
        Integer | IntegerPositive | IntegerNegative => XSD_INTEGER,
        Decimal | DecimalPositive | DecimalNegative => XSD_DECIMAL,
        _ => XSD_DOUBLE,
    };
    let term = ops
        .context()
        .factory
        .literal(ops.text(&token), None, Some(datatype));
    Ok(term.into())
}

fn boolean(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let token = ops.consume_any(set(&[KwTrue, KwFalse]))?;
    let value = if token.kind == KwTrue { "true" } else { "false" };
    Ok(ops
        .context()
        .factory
        .literal(value, None, Some(XSD_BOOLEAN))
        .into())
}

fn var(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let token = ops.consume_any(set(&[Var1, Var2]))?;
    let text = ops.text(&token);
    if !ops.gate(|ctx| ctx.mode.variables_allowed) {
        return Err(Diagnostic::new(DiagnosticKind::VariableNotAllowed, token.span)
            .message(text)
            .into());
    }
    Ok(ops.context().factory.variable(&text[1..]).into())
}

fn var_or_term(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.alternate(&[Alt::rule("Var"), Alt::rule("GraphTerm")])
}

fn var_or_iri(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let value = ops.alternate(&[Alt::rule("Var"), Alt::rule("iri")])?;
    Ok(into_term(ops, value)?.into())
}

fn graph_term(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    if !ops.starts("GraphTerm") {
        return Err(ops.expected(Lookahead::Rule("GraphTerm")));
    }
    if ops.at(Nil) {
        ops.consume(Nil)?;
        return Ok(ops.context().factory.named_node(RDF_NIL).into());
    }
    let value = ops.alternate(&[
        Alt::rule("iri"),
        Alt::rule("RDFLiteral"),
        Alt::rule("NumericLiteral"),
        Alt::rule("BooleanLiteral"),
        Alt::rule("BlankNode"),
    ])?;
    Ok(into_term(ops, value)?.into())
}

fn blank_node(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let token = ops.consume_any(set(&[BlankNodeLabel, Anon]))?;
    check_blank_allowed(ops, token.span)?;
    let term = if token.kind == BlankNodeLabel {
        let label = &ops.text(&token)[2..];
        ops.action(|ctx| ctx.use_label(label, token.span))?
    } else {
        ops.context().fresh_blank()
    };
    Ok(term.into())
}

/// Blank nodes, including the implicit ones of `[ ... ]` and collections, are
/// rejected inside `DELETE` templates and data.
pub(crate) fn check_blank_allowed(ops: &SparqlOps<'_>, range: TextRange) -> Result<()> {
    if ops.gate(|ctx| ctx.mode.blank_nodes_allowed) {
        Ok(())
    } else {
        Err(Diagnostic::new(DiagnosticKind::BlankNodeNotAllowed, range).into())
    }
}

/// `a`, which the lexer keeps case-sensitive.
pub(crate) fn rdf_type(ops: &SparqlOps<'_>) -> Term {
    ops.context().factory.named_node(RDF_TYPE)
}
