//! Property paths.
//!
//! Alternatives and sequences of one element collapse to that element. The
//! negated set keeps a different shape depending on how it was written: `!p` and
//! `!(p)` store the single element bare, while `!(p|q)` stores one
//! `Alternative`, and `!()` stores nothing.

use spindle_core::shape::{alt, many, opt, rule, sep_by1, seq, tok};
use spindle_core::{Lookahead, Rule};

use super::{SparqlOps, SparqlRule, Step, set};
use crate::SyntaxKind::*;
use crate::ast::{PathModifier, PropertyPath, RDF_TYPE};

pub fn path_rules() -> Vec<SparqlRule> {
    vec![
        Rule::new("Path", rule("PathAlternative"), path),
        Rule::new(
            "PathAlternative",
            sep_by1(rule("PathSequence"), Pipe),
            path_alternative,
        ),
        Rule::new(
            "PathSequence",
            sep_by1(rule("PathEltOrInverse"), Slash),
            path_sequence,
        ),
        Rule::new(
            "PathEltOrInverse",
            alt([rule("PathElt"), seq([tok(Caret), rule("PathElt")])]),
            path_elt_or_inverse,
        ),
        Rule::new(
            "PathElt",
            seq([rule("PathPrimary"), opt(rule("PathMod"))]),
            path_elt,
        ),
        Rule::new(
            "PathMod",
            alt([tok(Question), tok(Star), tok(Plus)]),
            path_mod,
        ),
        Rule::new(
            "PathPrimary",
            alt([
                rule("iri"),
                tok(KwA),
                seq([tok(Bang), rule("PathNegatedPropertySet")]),
                seq([tok(ParenOpen), rule("Path"), tok(ParenClose)]),
            ]),
            path_primary,
        ),
        Rule::new(
            "PathNegatedPropertySet",
            alt([
                rule("PathOneInPropertySet"),
                seq([
                    tok(ParenOpen),
                    opt(seq([
                        rule("PathOneInPropertySet"),
                        many(seq([tok(Pipe), rule("PathOneInPropertySet")])),
                    ])),
                    tok(ParenClose),
                ]),
                tok(Nil),
            ]),
            path_negated_property_set,
        ),
        Rule::new(
            "PathOneInPropertySet",
            alt([
                rule("iri"),
                tok(KwA),
                seq([tok(Caret), alt([rule("iri"), tok(KwA)])]),
            ]),
            path_one_in_property_set,
        ),
    ]
}

fn collapse(
    mut items: Vec<PropertyPath>,
    wrap: fn(Vec<PropertyPath>) -> PropertyPath,
) -> PropertyPath {
    if items.len() == 1 {
        items.remove(0)
    } else {
        wrap(items)
    }
}

fn path(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.subrule("PathAlternative", &[])
}

fn path_alternative(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let items = ops.at_least_one_sep(Pipe, |ops| {
        ops.sub::<PropertyPath>("PathSequence", &[])
    })?;
    Ok(collapse(items, PropertyPath::Alternative).into())
}

fn path_sequence(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let items = ops.at_least_one_sep(Slash, |ops| {
        ops.sub::<PropertyPath>("PathEltOrInverse", &[])
    })?;
    Ok(collapse(items, PropertyPath::Sequence).into())
}

fn path_elt_or_inverse(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let inverse = ops.option(Caret, |ops| ops.consume(Caret))?.is_some();
    let elt: PropertyPath = ops.sub("PathElt", &[])?;
    if inverse {
        Ok(PropertyPath::Inverse(Box::new(elt)).into())
    } else {
        Ok(elt.into())
    }
}

fn path_elt(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let primary: PropertyPath = ops.sub("PathPrimary", &[])?;
    let modifier = ops.option(Lookahead::Rule("PathMod"), |ops| {
        ops.sub::<PathModifier>("PathMod", &[])
    })?;
    Ok(match modifier {
        Some(modifier) => PropertyPath::Modified {
            modifier,
            path: Box::new(primary),
        },
        None => primary,
    }
    .into())
}

fn path_mod(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let token = ops.consume_any(set(&[Question, Star, Plus]))?;
    let modifier = match token.kind {
        Question => PathModifier::ZeroOrOne,
        Star => PathModifier::ZeroOrMore,
        _ => PathModifier::OneOrMore,
    };
    Ok(modifier.into())
}

fn path_primary(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    match ops.peek() {
        KwA => {
            ops.consume(KwA)?;
            Ok(PropertyPath::Iri(RDF_TYPE.to_string()).into())
        }
        Bang => {
            ops.consume(Bang)?;
            let items: Vec<PropertyPath> = ops.sub("PathNegatedPropertySet", &[])?;
            Ok(PropertyPath::NegatedSet(items).into())
        }
        ParenOpen => {
            ops.consume(ParenOpen)?;
            let path = ops.subrule("Path", &[])?;
            ops.consume(ParenClose)?;
            Ok(path)
        }
        _ => {
            let iri: String = ops.sub("iri", &[])?;
            Ok(PropertyPath::Iri(iri).into())
        }
    }
}

fn path_negated_property_set(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    if ops.at(Nil) {
        ops.consume(Nil)?;
        return Ok(Vec::<PropertyPath>::new().into());
    }
    if !ops.at(ParenOpen) {
        let one: PropertyPath = ops.sub("PathOneInPropertySet", &[])?;
        return Ok(vec![one].into());
    }

    ops.consume(ParenOpen)?;
    let items = ops.many_sep(Lookahead::Rule("PathOneInPropertySet"), Pipe, |ops| {
        ops.sub::<PropertyPath>("PathOneInPropertySet", &[])
    })?;
    ops.consume(ParenClose)?;

    let items = match items.len() {
        0 => Vec::new(),
        1 => items,
        _ => vec![PropertyPath::Alternative(items)],
    };
    Ok(items.into())
}

fn path_one_in_property_set(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let inverse = ops.option(Caret, |ops| ops.consume(Caret))?.is_some();
    let iri = if ops.at(KwA) {
        ops.consume(KwA)?;
        RDF_TYPE.to_string()
    } else {
        ops.sub::<String>("iri", &[])?
    };
    let path = PropertyPath::Iri(iri);
    if inverse {
        Ok(PropertyPath::Inverse(Box::new(path)).into())
    } else {
        Ok(path.into())
    }
}
