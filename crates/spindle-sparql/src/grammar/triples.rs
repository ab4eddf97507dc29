//! Triple patterns and their desugaring.
//!
//! Every rule here takes one positional argument: whether property paths are
//! allowed in predicate position. `WHERE` patterns pass `true`; construct
//! templates and update quads pass `false`.
//!
//! Output order within one subject: the direct triples of the first predicate,
//! then every later predicate's triples each followed by what its object
//! generated, then what the first predicate's objects generated.

use spindle_core::shape::{alt, gated, many, many1, opt, rule, sep_by1, seq, tok};
use spindle_core::{Alt, Lookahead, Rule};

use super::terms::{check_blank_allowed, rdf_type};
use super::{SparqlOps, SparqlRule, Step, allow_paths};
use crate::Result;
use crate::SyntaxKind::*;
use crate::ast::{Predicate, PropertyPath, RDF_FIRST, RDF_NIL, RDF_REST, Term, Triple};
use crate::value::{Node, PendingTriple};

pub fn triple_rules() -> Vec<SparqlRule> {
    vec![
        Rule::new(
            "TriplesSameSubject",
            alt([
                seq([rule("VarOrTerm"), rule("PropertyListNotEmpty")]),
                seq([rule("TriplesNode"), rule("PropertyList")]),
            ]),
            triples_same_subject,
        ),
        Rule::new(
            "PropertyList",
            opt(rule("PropertyListNotEmpty")),
            property_list,
        ),
        Rule::new(
            "PropertyListNotEmpty",
            seq([
                rule("Verb"),
                rule("ObjectList"),
                many(seq([
                    tok(Semicolon),
                    opt(seq([rule("Verb"), rule("ObjectList")])),
                ])),
            ]),
            property_list_not_empty,
        ),
        Rule::new(
            "Verb",
            alt([
                rule("VarOrIri"),
                tok(KwA),
                gated(rule("Var")),
                gated(rule("Path")),
            ]),
            verb,
        ),
        Rule::new("ObjectList", sep_by1(rule("Object"), Comma), object_list),
        Rule::new("Object", rule("GraphNode"), |ops: &mut SparqlOps<'_>, args: &[bool]| {
            ops.subrule("GraphNode", args)
        }),
        Rule::new(
            "GraphNode",
            alt([rule("VarOrTerm"), rule("TriplesNode")]),
            graph_node,
        ),
        Rule::new(
            "TriplesNode",
            alt([rule("Collection"), rule("BlankNodePropertyList")]),
            |ops: &mut SparqlOps<'_>, args: &[bool]| {
                ops.alternate(&[
                    Alt::rule("Collection").args(args),
                    Alt::rule("BlankNodePropertyList").args(args),
                ])
            },
        ),
        Rule::new(
            "BlankNodePropertyList",
            seq([
                tok(BracketOpen),
                rule("PropertyListNotEmpty"),
                tok(BracketClose),
            ]),
            blank_node_property_list,
        ),
        Rule::new(
            "Collection",
            seq([tok(ParenOpen), many1(rule("GraphNode")), tok(ParenClose)]),
            collection,
        ),
        Rule::new(
            "TriplesTemplate",
            seq([
                rule("TriplesSameSubject"),
                many(seq([tok(Dot), opt(rule("TriplesSameSubject"))])),
            ]),
            triples_template,
        ),
    ]
}

fn apply(pending: Vec<PendingTriple>, subject: &Term) -> Vec<Triple> {
    pending.into_iter().map(|p| p.apply(subject)).collect()
}

fn triples_same_subject(ops: &mut SparqlOps<'_>, args: &[bool]) -> Step {
    if ops.starts("VarOrTerm") {
        let subject: Term = ops.sub("VarOrTerm", &[])?;
        let pending: Vec<PendingTriple> = ops.sub("PropertyListNotEmpty", args)?;
        return Ok(apply(pending, &subject).into());
    }
    if !ops.starts("TriplesNode") {
        return Err(ops.expected(Lookahead::Rule("TriplesSameSubject")));
    }

    let node: Node = ops.sub("TriplesNode", args)?;
    let pending: Vec<PendingTriple> = ops.sub("PropertyList", args)?;
    let mut triples = apply(pending, &node.term);
    triples.extend(node.triples);
    Ok(triples.into())
}

fn property_list(ops: &mut SparqlOps<'_>, args: &[bool]) -> Step {
    if ops.starts("PropertyListNotEmpty") {
        return ops.subrule("PropertyListNotEmpty", args);
    }
    Ok(Vec::<PendingTriple>::new().into())
}

fn property_list_not_empty(ops: &mut SparqlOps<'_>, args: &[bool]) -> Step {
    let (mut out, first_nested): (Vec<_>, Vec<_>) =
        verb_object_list(ops, args)?.into_iter().unzip();
    ops.many(Semicolon, |ops| {
        ops.consume(Semicolon)?;
        if ops.starts("Verb") {
            for (direct, nested) in verb_object_list(ops, args)? {
                out.push(direct);
                out.extend(nested);
            }
        }
        Ok(())
    })?;
    out.extend(first_nested.into_iter().flatten());
    Ok(out.into())
}

/// One entry per object: the direct triple and what the object's nested
/// syntax generated.
fn verb_object_list(
    ops: &mut SparqlOps<'_>,
    args: &[bool],
) -> Result<Vec<(PendingTriple, Vec<PendingTriple>)>> {
    let predicate: Predicate = ops.sub("Verb", args)?;
    let objects: Vec<Node> = ops.sub("ObjectList", args)?;

    Ok(objects
        .into_iter()
        .map(|node| {
            let direct = PendingTriple::Direct {
                predicate: predicate.clone(),
                object: node.term,
            };
            let nested = node.triples.into_iter().map(PendingTriple::Complete).collect();
            (direct, nested)
        })
        .collect())
}

fn verb(ops: &mut SparqlOps<'_>, args: &[bool]) -> Step {
    if !allow_paths(args) {
        if ops.at(KwA) {
            ops.consume(KwA)?;
            return Ok(Predicate::Term(rdf_type(ops)).into());
        }
        let term: Term = ops.sub("VarOrIri", &[])?;
        return Ok(Predicate::Term(term).into());
    }

    if ops.starts("Var") {
        let term: Term = ops.sub("Var", &[])?;
        return Ok(Predicate::Term(term).into());
    }
    let path: PropertyPath = ops.sub("Path", &[])?;
    Ok(Predicate::from(path).into())
}

fn object_list(ops: &mut SparqlOps<'_>, args: &[bool]) -> Step {
    let objects = ops.at_least_one_sep(Comma, |ops| ops.sub::<Node>("Object", args))?;
    Ok(objects.into())
}

fn graph_node(ops: &mut SparqlOps<'_>, args: &[bool]) -> Step {
    if ops.starts("VarOrTerm") {
        let term: Term = ops.sub("VarOrTerm", &[])?;
        return Ok(Node::bare(term).into());
    }
    ops.alternate(&[Alt::rule("TriplesNode").args(args)])
}

/// `[ p o ]`: the property list is parsed before the node is allocated, so
/// nested anonymous nodes get lower numbers than their parent.
fn blank_node_property_list(ops: &mut SparqlOps<'_>, args: &[bool]) -> Step {
    let open = ops.consume(BracketOpen)?;
    check_blank_allowed(ops, open.span)?;
    let pending: Vec<PendingTriple> = ops.sub("PropertyListNotEmpty", args)?;
    ops.consume(BracketClose)?;

    let subject = ops.context().fresh_blank();
    Ok(Node {
        triples: apply(pending, &subject),
        term: subject,
    }
    .into())
}

/// `( a b )`: list cells first, in order, followed by what the items generated.
fn collection(ops: &mut SparqlOps<'_>, args: &[bool]) -> Step {
    let open = ops.consume(ParenOpen)?;
    check_blank_allowed(ops, open.span)?;
    let items = ops.at_least_one(Lookahead::Rule("GraphNode"), |ops| {
        ops.sub::<Node>("GraphNode", args)
    })?;
    ops.consume(ParenClose)?;

    let factory = ops.context().factory.clone();
    let first = factory.named_node(RDF_FIRST);
    let rest = factory.named_node(RDF_REST);
    let head = ops.context().fresh_blank();

    let mut triples = Vec::with_capacity(items.len() * 2);
    let mut generated = Vec::new();
    let mut cell = head.clone();
    let count = items.len();
    for (i, item) in items.into_iter().enumerate() {
        triples.push(Triple {
            subject: cell.clone(),
            predicate: Predicate::Term(first.clone()),
            object: item.term,
        });
        let next = if i + 1 < count {
            ops.context().fresh_blank()
        } else {
            factory.named_node(RDF_NIL)
        };
        triples.push(Triple {
            subject: cell,
            predicate: Predicate::Term(rest.clone()),
            object: next.clone(),
        });
        cell = next;
        generated.extend(item.triples);
    }
    triples.extend(generated);

    Ok(Node {
        term: head,
        triples,
    }
    .into())
}

fn triples_template(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let mut triples: Vec<Triple> = ops.sub("TriplesSameSubject", &[false])?;
    ops.many(Dot, |ops| {
        ops.consume(Dot)?;
        if ops.starts("TriplesSameSubject") {
            triples.extend(ops.sub::<Vec<Triple>>("TriplesSameSubject", &[false])?);
        }
        Ok(())
    })?;
    Ok(triples.into())
}
