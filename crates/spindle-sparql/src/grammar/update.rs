//! Update requests: graph management and the data-changing operations.
//!
//! Operations are separated by `;` and each may be preceded by its own
//! prologue. Blank node labels are flushed after every operation, so the label
//! check sees one operation at a time unless strict scoping is enabled.

use spindle_core::shape::{alt, gated, many, opt, rule, seq, tok};
use spindle_core::{Alt, Lookahead, Rule};

use super::{SparqlOps, SparqlRule, Step, set, with_mode};
use crate::Result;
use crate::SyntaxKind::{self, *};
use crate::ast::{Dataset, GraphTarget, Quads, Term, Triple, Update, UpdateOperation};
use crate::value::DatasetClause;

fn data_follows(ops: &SparqlOps<'_>) -> bool {
    ops.peek_nth(1) == KwData
}

fn where_follows(ops: &SparqlOps<'_>) -> bool {
    ops.peek_nth(1) == KwWhere
}

pub fn update_rules() -> Vec<SparqlRule> {
    let silent = || opt(tok(KwSilent));
    let transfer = |keyword| {
        seq([
            tok(keyword),
            silent(),
            rule("GraphOrDefault"),
            tok(KwTo),
            rule("GraphOrDefault"),
        ])
    };

    vec![
        Rule::new("UpdateUnit", rule("Update"), |ops: &mut SparqlOps<'_>, _: &[bool]| {
            ops.subrule("Update", &[])
        }),
        Rule::new(
            "Update",
            seq([
                rule("Prologue"),
                opt(seq([
                    rule("Update1"),
                    opt(seq([tok(Semicolon), rule("Update")])),
                ])),
            ]),
            update,
        ),
        Rule::new(
            "Update1",
            alt([
                rule("Load"),
                rule("Clear"),
                rule("Drop"),
                rule("Add"),
                rule("Move"),
                rule("Copy"),
                rule("Create"),
                gated(rule("InsertData")),
                gated(rule("DeleteData")),
                gated(rule("DeleteWhere")),
                rule("Modify"),
            ]),
            update1,
        ),
        Rule::new(
            "Load",
            seq([
                tok(KwLoad),
                silent(),
                rule("iri"),
                opt(seq([tok(KwInto), rule("GraphRef")])),
            ]),
            load,
        ),
        Rule::new(
            "Clear",
            seq([tok(KwClear), silent(), rule("GraphRefAll")]),
            |ops: &mut SparqlOps<'_>, _: &[bool]| {
                let (silent, target) = graph_management(ops, KwClear)?;
                Ok(UpdateOperation::Clear { silent, target }.into())
            },
        ),
        Rule::new(
            "Drop",
            seq([tok(KwDrop), silent(), rule("GraphRefAll")]),
            |ops: &mut SparqlOps<'_>, _: &[bool]| {
                let (silent, target) = graph_management(ops, KwDrop)?;
                Ok(UpdateOperation::Drop { silent, target }.into())
            },
        ),
        Rule::new(
            "Create",
            seq([tok(KwCreate), silent(), rule("GraphRef")]),
            create,
        ),
        Rule::new("Add", transfer(KwAdd), |ops: &mut SparqlOps<'_>, _: &[bool]| {
            let (silent, from, to) = graph_transfer(ops, KwAdd)?;
            Ok(UpdateOperation::Add { silent, from, to }.into())
        }),
        Rule::new("Move", transfer(KwMove), |ops: &mut SparqlOps<'_>, _: &[bool]| {
            let (silent, from, to) = graph_transfer(ops, KwMove)?;
            Ok(UpdateOperation::Move { silent, from, to }.into())
        }),
        Rule::new("Copy", transfer(KwCopy), |ops: &mut SparqlOps<'_>, _: &[bool]| {
            let (silent, from, to) = graph_transfer(ops, KwCopy)?;
            Ok(UpdateOperation::Copy { silent, from, to }.into())
        }),
        Rule::new(
            "InsertData",
            seq([tok(KwInsert), tok(KwData), rule("QuadData")]),
            insert_data,
        ),
        Rule::new(
            "DeleteData",
            seq([tok(KwDelete), tok(KwData), rule("QuadData")]),
            delete_data,
        ),
        Rule::new(
            "DeleteWhere",
            seq([tok(KwDelete), tok(KwWhere), rule("QuadPattern")]),
            delete_where,
        ),
        Rule::new(
            "Modify",
            seq([
                opt(seq([tok(KwWith), rule("iri")])),
                alt([
                    seq([rule("DeleteClause"), opt(rule("InsertClause"))]),
                    rule("InsertClause"),
                ]),
                many(rule("UsingClause")),
                tok(KwWhere),
                rule("GroupGraphPattern"),
            ]),
            modify,
        ),
        Rule::new(
            "DeleteClause",
            seq([tok(KwDelete), rule("QuadPattern")]),
            delete_clause,
        ),
        Rule::new(
            "InsertClause",
            seq([tok(KwInsert), rule("QuadPattern")]),
            |ops: &mut SparqlOps<'_>, _: &[bool]| {
                ops.consume(KwInsert)?;
                ops.subrule("QuadPattern", &[])
            },
        ),
        Rule::new(
            "UsingClause",
            seq([tok(KwUsing), opt(tok(KwNamed)), rule("iri")]),
            using_clause,
        ),
        Rule::new(
            "GraphOrDefault",
            alt([tok(KwDefault), seq([opt(tok(KwGraph)), rule("iri")])]),
            graph_or_default,
        ),
        Rule::new(
            "GraphRef",
            seq([tok(KwGraph), rule("iri")]),
            |ops: &mut SparqlOps<'_>, _: &[bool]| {
                ops.consume(KwGraph)?;
                ops.subrule("iri", &[])
            },
        ),
        Rule::new(
            "GraphRefAll",
            alt([
                rule("GraphRef"),
                tok(KwDefault),
                tok(KwNamed),
                tok(KwAll),
            ]),
            graph_ref_all,
        ),
        Rule::new(
            "QuadPattern",
            seq([tok(BraceOpen), rule("Quads"), tok(BraceClose)]),
            braced_quads,
        ),
        Rule::new(
            "QuadData",
            seq([tok(BraceOpen), rule("Quads"), tok(BraceClose)]),
            braced_quads,
        ),
        Rule::new(
            "Quads",
            seq([
                opt(rule("TriplesTemplate")),
                many(seq([
                    rule("QuadsNotTriples"),
                    opt(tok(Dot)),
                    opt(rule("TriplesTemplate")),
                ])),
            ]),
            quads,
        ),
        Rule::new(
            "QuadsNotTriples",
            seq([
                tok(KwGraph),
                rule("VarOrIri"),
                tok(BraceOpen),
                opt(rule("TriplesTemplate")),
                tok(BraceClose),
            ]),
            quads_not_triples,
        ),
    ]
}

fn update(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let mut operations = Vec::new();
    loop {
        ops.subrule("Prologue", &[])?;
        if !ops.starts("Update1") {
            break;
        }
        operations.push(ops.sub::<UpdateOperation>("Update1", &[])?);
        ops.action(|ctx| ctx.flush_labels());
        if ops.eat(Semicolon).is_none() {
            break;
        }
    }

    let ctx = ops.context();
    Ok(Update {
        base: ctx.base_iri().map(str::to_string),
        prefixes: ctx.prefixes().clone(),
        operations,
    }
    .into())
}

fn update1(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.alternate(&[
        Alt::rule("Load"),
        Alt::rule("Clear"),
        Alt::rule("Drop"),
        Alt::rule("Add"),
        Alt::rule("Move"),
        Alt::rule("Copy"),
        Alt::rule("Create"),
        Alt::rule("InsertData").gate(data_follows),
        Alt::rule("DeleteData").gate(data_follows),
        Alt::rule("DeleteWhere").gate(where_follows),
        Alt::rule("Modify"),
    ])
}

fn load(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwLoad)?;
    let silent = ops.eat(KwSilent).is_some();
    let source: String = ops.sub("iri", &[])?;
    let destination = ops.option(KwInto, |ops| {
        ops.consume(KwInto)?;
        ops.sub::<String>("GraphRef", &[])
    })?;
    Ok(UpdateOperation::Load {
        silent,
        source,
        destination,
    }
    .into())
}

fn graph_management(ops: &mut SparqlOps<'_>, keyword: SyntaxKind) -> Result<(bool, GraphTarget)> {
    ops.consume(keyword)?;
    let silent = ops.eat(KwSilent).is_some();
    let target = ops.sub("GraphRefAll", &[])?;
    Ok((silent, target))
}

fn create(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwCreate)?;
    let silent = ops.eat(KwSilent).is_some();
    let graph: String = ops.sub("GraphRef", &[])?;
    Ok(UpdateOperation::Create { silent, graph }.into())
}

/// `ADD` / `MOVE` / `COPY`.
fn graph_transfer(
    ops: &mut SparqlOps<'_>,
    keyword: SyntaxKind,
) -> Result<(bool, GraphTarget, GraphTarget)> {
    ops.consume(keyword)?;
    let silent = ops.eat(KwSilent).is_some();
    let from = ops.sub("GraphOrDefault", &[])?;
    ops.consume(KwTo)?;
    let to = ops.sub("GraphOrDefault", &[])?;
    Ok((silent, from, to))
}

/// `INSERT DATA`: ground quads, blank nodes allowed.
fn insert_data(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwInsert)?;
    ops.consume(KwData)?;
    let data = with_mode(
        ops,
        |mode| mode.variables_allowed = false,
        |ops| ops.sub::<Vec<Quads>>("QuadData", &[]),
    )?;
    Ok(UpdateOperation::InsertData { data }.into())
}

fn delete_data(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwDelete)?;
    ops.consume(KwData)?;
    let data = with_mode(
        ops,
        |mode| {
            mode.variables_allowed = false;
            mode.blank_nodes_allowed = false;
        },
        |ops| ops.sub::<Vec<Quads>>("QuadData", &[]),
    )?;
    Ok(UpdateOperation::DeleteData { data }.into())
}

fn delete_where(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwDelete)?;
    ops.consume(KwWhere)?;
    let patterns = with_mode(
        ops,
        |mode| mode.blank_nodes_allowed = false,
        |ops| ops.sub::<Vec<Quads>>("QuadPattern", &[]),
    )?;
    Ok(UpdateOperation::DeleteWhere { patterns }.into())
}

fn modify(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let with = ops.option(KwWith, |ops| {
        ops.consume(KwWith)?;
        ops.sub::<String>("iri", &[])
    })?;

    if !ops.at_any(set(&[KwDelete, KwInsert])) {
        return Err(ops.expected(set(&[KwDelete, KwInsert])));
    }
    let delete = ops.option(KwDelete, |ops| ops.sub::<Vec<Quads>>("DeleteClause", &[]))?;
    let insert = ops.option(KwInsert, |ops| ops.sub::<Vec<Quads>>("InsertClause", &[]))?;

    let clauses = ops.many(KwUsing, |ops| ops.sub::<DatasetClause>("UsingClause", &[]))?;
    let mut using = Dataset::default();
    for clause in clauses {
        if clause.named {
            using.named.push(clause.iri);
        } else {
            using.default.push(clause.iri);
        }
    }

    ops.consume(KwWhere)?;
    let where_clause = ops.sub("GroupGraphPattern", &[])?;
    Ok(UpdateOperation::Modify {
        with,
        delete: delete.unwrap_or_default(),
        insert: insert.unwrap_or_default(),
        using,
        where_clause,
    }
    .into())
}

/// `DELETE { ... }`: deleting a fresh blank node could never match, so blank
/// nodes are rejected.
fn delete_clause(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwDelete)?;
    let quads = with_mode(
        ops,
        |mode| mode.blank_nodes_allowed = false,
        |ops| ops.sub::<Vec<Quads>>("QuadPattern", &[]),
    )?;
    Ok(quads.into())
}

fn using_clause(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwUsing)?;
    let named = ops.eat(KwNamed).is_some();
    let iri: String = ops.sub("iri", &[])?;
    Ok(DatasetClause { named, iri }.into())
}

fn graph_or_default(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    if ops.eat(KwDefault).is_some() {
        return Ok(GraphTarget::Default.into());
    }
    ops.eat(KwGraph);
    let iri: String = ops.sub("iri", &[])?;
    Ok(GraphTarget::Graph(iri).into())
}

fn graph_ref_all(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let target = match ops.peek() {
        KwDefault => GraphTarget::Default,
        KwNamed => GraphTarget::Named,
        KwAll => GraphTarget::All,
        _ => {
            let iri: String = ops.sub("GraphRef", &[])?;
            return Ok(GraphTarget::Graph(iri).into());
        }
    };
    ops.consume(ops.peek())?;
    Ok(target.into())
}

/// `{ Quads }`, one blank node label scope.
fn braced_quads(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(BraceOpen)?;
    ops.action(|ctx| ctx.enter_label_scope());
    let quads = ops.subrule("Quads", &[])?;
    ops.action(|ctx| ctx.exit_label_scope());
    ops.consume(BraceClose)?;
    Ok(quads)
}

/// Default-graph triples between `GRAPH` blocks are kept as separate
/// entries, in source order.
fn quads(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let mut out = Vec::new();
    push_default_graph(ops, &mut out)?;
    ops.many(KwGraph, |ops| {
        let graph: Quads = ops.sub("QuadsNotTriples", &[])?;
        out.push(graph);
        ops.eat(Dot);
        push_default_graph(ops, &mut out)
    })?;
    Ok(out.into())
}

fn push_default_graph(ops: &mut SparqlOps<'_>, out: &mut Vec<Quads>) -> Result<()> {
    if ops.starts("TriplesTemplate") {
        let triples = ops.sub("TriplesTemplate", &[])?;
        out.push(Quads {
            graph: None,
            triples,
        });
    }
    Ok(())
}

fn quads_not_triples(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwGraph)?;
    let graph: Term = ops.sub("VarOrIri", &[])?;
    ops.consume(BraceOpen)?;
    let triples = ops.option(Lookahead::Rule("TriplesTemplate"), |ops| {
        ops.sub::<Vec<Triple>>("TriplesTemplate", &[])
    })?;
    ops.consume(BraceClose)?;
    Ok(Quads {
        graph: Some(graph),
        triples: triples.unwrap_or_default(),
    }
    .into())
}
