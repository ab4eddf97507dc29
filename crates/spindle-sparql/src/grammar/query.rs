//! Prologue, the four query forms and solution modifiers.

use indexmap::IndexSet;
use spindle_core::shape::{alt, many, many1, opt, rule, seq, tok};
use spindle_core::{Alt, Lookahead, Rule};

use super::{SparqlOps, SparqlRule, Step, expect, into_expression, set, with_mode};
use crate::Result;
use crate::SyntaxKind::{self, *};
use crate::ast::{
    Dataset, Expression, GroupCondition, OrderCondition, Pattern, Prefixes, Projection,
    ProjectionItem, Query, QueryForm, SolutionModifiers, Term, Triple, ValuesBlock,
};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::value::{DatasetClause, SelectClause};

pub fn query_rules() -> Vec<SparqlRule> {
    let bound = || {
        seq([
            tok(ParenOpen),
            rule("Expression"),
            tok(KwAs),
            rule("Var"),
            tok(ParenClose),
        ])
    };

    vec![
        Rule::new("QueryUnit", rule("Query"), |ops: &mut SparqlOps<'_>, _: &[bool]| {
            ops.subrule("Query", &[])
        }),
        Rule::new(
            "Query",
            seq([
                rule("Prologue"),
                alt([
                    rule("SelectQuery"),
                    rule("ConstructQuery"),
                    rule("DescribeQuery"),
                    rule("AskQuery"),
                ]),
                opt(rule("ValuesClause")),
            ]),
            query,
        ),
        Rule::new(
            "Prologue",
            many(alt([rule("BaseDecl"), rule("PrefixDecl")])),
            prologue,
        ),
        Rule::new("BaseDecl", seq([tok(KwBase), tok(IriRef)]), base_decl),
        Rule::new(
            "PrefixDecl",
            seq([tok(KwPrefix), tok(PnameNs), tok(IriRef)]),
            prefix_decl,
        ),
        Rule::new(
            "SelectQuery",
            seq([
                rule("SelectClause"),
                many(rule("DatasetClause")),
                rule("WhereClause"),
                rule("SolutionModifier"),
            ]),
            select_query,
        ),
        Rule::new(
            "SubSelect",
            seq([
                rule("SelectClause"),
                rule("WhereClause"),
                rule("SolutionModifier"),
                opt(rule("ValuesClause")),
            ]),
            sub_select,
        ),
        Rule::new(
            "SelectClause",
            seq([
                tok(KwSelect),
                opt(alt([tok(KwDistinct), tok(KwReduced)])),
                alt([many1(alt([rule("Var"), bound()])), tok(Star)]),
            ]),
            select_clause,
        ),
        Rule::new(
            "ConstructQuery",
            seq([
                tok(KwConstruct),
                alt([
                    seq([
                        rule("ConstructTemplate"),
                        many(rule("DatasetClause")),
                        rule("WhereClause"),
                        rule("SolutionModifier"),
                    ]),
                    seq([
                        many(rule("DatasetClause")),
                        tok(KwWhere),
                        tok(BraceOpen),
                        opt(rule("TriplesTemplate")),
                        tok(BraceClose),
                        rule("SolutionModifier"),
                    ]),
                ]),
            ]),
            construct_query,
        ),
        Rule::new(
            "ConstructTemplate",
            seq([tok(BraceOpen), opt(rule("TriplesTemplate")), tok(BraceClose)]),
            construct_template,
        ),
        Rule::new(
            "DescribeQuery",
            seq([
                tok(KwDescribe),
                alt([many1(rule("VarOrIri")), tok(Star)]),
                many(rule("DatasetClause")),
                opt(rule("WhereClause")),
                rule("SolutionModifier"),
            ]),
            describe_query,
        ),
        Rule::new(
            "AskQuery",
            seq([
                tok(KwAsk),
                many(rule("DatasetClause")),
                rule("WhereClause"),
                rule("SolutionModifier"),
            ]),
            ask_query,
        ),
        Rule::new(
            "DatasetClause",
            seq([tok(KwFrom), opt(tok(KwNamed)), rule("iri")]),
            dataset_clause,
        ),
        Rule::new(
            "WhereClause",
            seq([opt(tok(KwWhere)), rule("GroupGraphPattern")]),
            |ops: &mut SparqlOps<'_>, _: &[bool]| {
                ops.eat(KwWhere);
                ops.subrule("GroupGraphPattern", &[])
            },
        ),
        Rule::new(
            "SolutionModifier",
            seq([
                opt(rule("GroupClause")),
                opt(rule("HavingClause")),
                opt(rule("OrderClause")),
                opt(rule("LimitOffsetClauses")),
            ]),
            solution_modifier,
        ),
        Rule::new(
            "GroupClause",
            seq([tok(KwGroup), tok(KwBy), many1(rule("GroupCondition"))]),
            group_clause,
        ),
        Rule::new(
            "GroupCondition",
            alt([
                rule("BuiltInCall"),
                rule("FunctionCall"),
                seq([
                    tok(ParenOpen),
                    rule("Expression"),
                    opt(seq([tok(KwAs), rule("Var")])),
                    tok(ParenClose),
                ]),
                rule("Var"),
            ]),
            group_condition,
        ),
        Rule::new(
            "HavingClause",
            seq([tok(KwHaving), many1(rule("Constraint"))]),
            having_clause,
        ),
        Rule::new(
            "OrderClause",
            seq([tok(KwOrder), tok(KwBy), many1(rule("OrderCondition"))]),
            order_clause,
        ),
        Rule::new(
            "OrderCondition",
            alt([
                seq([
                    alt([tok(KwAsc), tok(KwDesc)]),
                    rule("BrackettedExpression"),
                ]),
                rule("Constraint"),
                rule("Var"),
            ]),
            order_condition,
        ),
        Rule::new(
            "LimitOffsetClauses",
            alt([
                seq([rule("LimitClause"), opt(rule("OffsetClause"))]),
                seq([rule("OffsetClause"), opt(rule("LimitClause"))]),
            ]),
            limit_offset_clauses,
        ),
        Rule::new(
            "LimitClause",
            seq([tok(KwLimit), tok(Integer)]),
            |ops: &mut SparqlOps<'_>, _: &[bool]| count(ops, KwLimit),
        ),
        Rule::new(
            "OffsetClause",
            seq([tok(KwOffset), tok(Integer)]),
            |ops: &mut SparqlOps<'_>, _: &[bool]| count(ops, KwOffset),
        ),
        Rule::new(
            "ValuesClause",
            seq([tok(KwValues), rule("DataBlock")]),
            |ops: &mut SparqlOps<'_>, _: &[bool]| {
                ops.consume(KwValues)?;
                ops.subrule("DataBlock", &[])
            },
        ),
    ]
}

fn query(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.subrule("Prologue", &[])?;
    let value = ops.alternate(&[
        Alt::rule("SelectQuery"),
        Alt::rule("ConstructQuery"),
        Alt::rule("DescribeQuery"),
        Alt::rule("AskQuery"),
    ])?;
    let mut query: Query = expect("Query", value)?;
    query.values = ops.option(KwValues, |ops| ops.sub::<ValuesBlock>("ValuesClause", &[]))?;

    let ctx = ops.context();
    query.base = ctx.base_iri().map(str::to_string);
    query.prefixes = ctx.prefixes().clone();
    Ok(query.into())
}

fn prologue(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.many(set(&[KwBase, KwPrefix]), |ops| {
        if ops.at(KwBase) {
            ops.subrule("BaseDecl", &[])
        } else {
            ops.subrule("PrefixDecl", &[])
        }
    })?;
    Ok(().into())
}

fn base_decl(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwBase)?;
    let token = ops.consume(IriRef)?;
    let text = ops.text(&token);
    ops.action(|ctx| ctx.set_base(&text[1..text.len() - 1], token.span))?;
    Ok(().into())
}

/// A later declaration of the same prefix replaces the earlier one.
fn prefix_decl(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwPrefix)?;
    let name = ops.consume(PnameNs)?;
    let name = ops.text(&name);
    let prefix = name.strip_suffix(':').unwrap_or(name);

    let token = ops.consume(IriRef)?;
    let text = ops.text(&token);
    let namespace = ops
        .context()
        .resolve_iri(&text[1..text.len() - 1], token.span)?;
    ops.action(|ctx| ctx.prefixes.insert(prefix.to_string(), namespace));
    Ok(().into())
}

fn empty_query(form: QueryForm) -> Query {
    Query {
        base: None,
        prefixes: Prefixes::new(),
        form,
        dataset: Dataset::default(),
        where_clause: None,
        modifiers: SolutionModifiers::default(),
        values: None,
    }
}

fn select(ops: &mut SparqlOps<'_>, with_dataset: bool) -> Result<Query> {
    let clause: SelectClause = ops.sub("SelectClause", &[])?;
    let dataset = if with_dataset {
        dataset_clauses(ops)?
    } else {
        Dataset::default()
    };
    let where_clause: Vec<Pattern> = ops.sub("WhereClause", &[])?;
    let modifiers: SolutionModifiers = ops.sub("SolutionModifier", &[])?;
    check_grouping(&clause, &modifiers)?;

    let SelectClause {
        distinct,
        reduced,
        projection,
        ..
    } = clause;
    Ok(Query {
        dataset,
        where_clause: Some(where_clause),
        modifiers,
        ..empty_query(QueryForm::Select {
            distinct,
            reduced,
            projection,
        })
    })
}

fn select_query(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    Ok(select(ops, true)?.into())
}

fn sub_select(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let mut query = select(ops, false)?;
    query.values = ops.option(KwValues, |ops| ops.sub::<ValuesBlock>("ValuesClause", &[]))?;
    Ok(query.into())
}

fn select_clause(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwSelect)?;
    let distinct = ops.eat(KwDistinct).is_some();
    let reduced = !distinct && ops.eat(KwReduced).is_some();

    if ops.at(Star) {
        let star = ops.consume(Star)?;
        return Ok(SelectClause {
            distinct,
            reduced,
            projection: Projection::Wildcard,
            spans: vec![star.span],
        }
        .into());
    }

    let mut projected = IndexSet::new();
    let mut spans = Vec::new();
    let items = ops.at_least_one(set(&[Var1, Var2, ParenOpen]), |ops| {
        let start = ops.mark();
        let item = if ops.at(ParenOpen) {
            projection_binding(ops)?
        } else {
            ProjectionItem::Term(ops.sub("Var", &[])?)
        };
        let range = ops.span_from(start);

        let (name, rebinds) = match &item {
            ProjectionItem::Term(term) => (term.as_variable(), false),
            ProjectionItem::Bound { variable, .. } => (variable.as_variable(), true),
        };
        if let Some(name) = name
            && !projected.insert(name.to_string())
            && rebinds
        {
            return Err(Diagnostic::new(DiagnosticKind::DuplicateProjection, range)
                .message(format!("?{}", name))
                .into());
        }
        spans.push(range);
        Ok(item)
    })?;

    Ok(SelectClause {
        distinct,
        reduced,
        projection: Projection::Items(items),
        spans,
    }
    .into())
}

/// `(expression AS ?var)`; the expression may aggregate.
fn projection_binding(ops: &mut SparqlOps<'_>) -> Result<ProjectionItem> {
    ops.consume(ParenOpen)?;
    let expression = with_mode(
        ops,
        |mode| mode.aggregates_allowed = true,
        |ops| ops.sub::<Expression>("Expression", &[]),
    )?;
    ops.consume(KwAs)?;
    let variable: Term = ops.sub("Var", &[])?;
    ops.consume(ParenClose)?;
    Ok(ProjectionItem::Bound {
        expression,
        variable,
    })
}

/// In an aggregate query every projected variable must be grouped, or be bound
/// by an earlier `AS` of the same projection.
fn check_grouping(clause: &SelectClause, modifiers: &SolutionModifiers) -> Result<()> {
    let items = match &clause.projection {
        Projection::Wildcard if !modifiers.group.is_empty() => {
            let range = clause.spans.first().copied().unwrap_or_default();
            return Err(Diagnostic::new(DiagnosticKind::WildcardWithGroupBy, range).into());
        }
        Projection::Wildcard => return Ok(()),
        Projection::Items(items) => items,
    };

    let aggregated = !modifiers.group.is_empty()
        || modifiers.having.iter().any(Expression::contains_aggregate)
        || items.iter().any(|item| {
            matches!(item, ProjectionItem::Bound { expression, .. } if expression.contains_aggregate())
        });
    if !aggregated {
        return Ok(());
    }

    let mut grouped = IndexSet::new();
    for condition in &modifiers.group {
        match (&condition.variable, &condition.expression) {
            (Some(variable), _) | (None, Expression::Term(variable)) => {
                if let Some(name) = variable.as_variable() {
                    grouped.insert(name.to_string());
                }
            }
            _ => {}
        }
    }

    for (item, &range) in items.iter().zip(&clause.spans) {
        let mut used = IndexSet::new();
        match item {
            ProjectionItem::Term(term) => {
                if let Some(name) = term.as_variable() {
                    used.insert(name.to_string());
                }
            }
            ProjectionItem::Bound { expression, .. } => expression.free_variables(&mut used),
        }
        if let Some(name) = used.iter().find(|name| !grouped.contains(*name)) {
            return Err(Diagnostic::new(DiagnosticKind::UngroupedVariable, range)
                .message(format!("?{}", name))
                .into());
        }
        if let ProjectionItem::Bound { variable, .. } = item
            && let Some(name) = variable.as_variable()
        {
            grouped.insert(name.to_string());
        }
    }
    Ok(())
}

fn construct_query(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwConstruct)?;

    if ops.at(BraceOpen) {
        let template: Vec<Triple> = ops.sub("ConstructTemplate", &[])?;
        let dataset = dataset_clauses(ops)?;
        let where_clause: Vec<Pattern> = ops.sub("WhereClause", &[])?;
        let modifiers = ops.sub("SolutionModifier", &[])?;
        return Ok(Query {
            dataset,
            where_clause: Some(where_clause),
            modifiers,
            ..empty_query(QueryForm::Construct { template })
        }
        .into());
    }

    // CONSTRUCT WHERE { template }: the template doubles as the pattern.
    let dataset = dataset_clauses(ops)?;
    ops.consume(KwWhere)?;
    let template = braced_template(ops)?;
    let modifiers = ops.sub("SolutionModifier", &[])?;
    Ok(Query {
        dataset,
        where_clause: Some(vec![Pattern::Bgp {
            triples: template.clone(),
        }]),
        modifiers,
        ..empty_query(QueryForm::Construct { template })
    }
    .into())
}

fn construct_template(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    Ok(braced_template(ops)?.into())
}

/// `{ TriplesTemplate? }` as its own blank node label scope.
fn braced_template(ops: &mut SparqlOps<'_>) -> Result<Vec<Triple>> {
    ops.consume(BraceOpen)?;
    ops.action(|ctx| ctx.enter_label_scope());
    let triples = ops.option(Lookahead::Rule("TriplesTemplate"), |ops| {
        ops.sub::<Vec<Triple>>("TriplesTemplate", &[])
    })?;
    ops.action(|ctx| ctx.exit_label_scope());
    ops.consume(BraceClose)?;
    Ok(triples.unwrap_or_default())
}

fn describe_query(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwDescribe)?;
    let targets = if ops.eat(Star).is_some() {
        Projection::Wildcard
    } else {
        let terms = ops.at_least_one(Lookahead::Rule("VarOrIri"), |ops| {
            ops.sub::<Term>("VarOrIri", &[]).map(ProjectionItem::Term)
        })?;
        Projection::Items(terms)
    };
    let dataset = dataset_clauses(ops)?;
    let where_clause = ops.option(Lookahead::Rule("WhereClause"), |ops| {
        ops.sub::<Vec<Pattern>>("WhereClause", &[])
    })?;
    let modifiers = ops.sub("SolutionModifier", &[])?;
    Ok(Query {
        dataset,
        where_clause,
        modifiers,
        ..empty_query(QueryForm::Describe { targets })
    }
    .into())
}

fn ask_query(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwAsk)?;
    let dataset = dataset_clauses(ops)?;
    let where_clause: Vec<Pattern> = ops.sub("WhereClause", &[])?;
    let modifiers = ops.sub("SolutionModifier", &[])?;
    Ok(Query {
        dataset,
        where_clause: Some(where_clause),
        modifiers,
        ..empty_query(QueryForm::Ask)
    }
    .into())
}

fn dataset_clauses(ops: &mut SparqlOps<'_>) -> Result<Dataset> {
    let clauses = ops.many(KwFrom, |ops| ops.sub::<DatasetClause>("DatasetClause", &[]))?;
    let mut dataset = Dataset::default();
    for clause in clauses {
        if clause.named {
            dataset.named.push(clause.iri);
        } else {
            dataset.default.push(clause.iri);
        }
    }
    Ok(dataset)
}

fn dataset_clause(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwFrom)?;
    let named = ops.eat(KwNamed).is_some();
    let iri: String = ops.sub("iri", &[])?;
    Ok(DatasetClause { named, iri }.into())
}

fn solution_modifier(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let group = ops.option(KwGroup, |ops| ops.sub::<Vec<GroupCondition>>("GroupClause", &[]))?;
    let having = ops.option(KwHaving, |ops| ops.sub::<Vec<Expression>>("HavingClause", &[]))?;
    let order = ops.option(KwOrder, |ops| ops.sub::<Vec<OrderCondition>>("OrderClause", &[]))?;
    let window = ops.option(set(&[KwLimit, KwOffset]), |ops| {
        ops.sub::<SolutionModifiers>("LimitOffsetClauses", &[])
    })?;
    let (limit, offset) = window.map_or((None, None), |w| (w.limit, w.offset));

    Ok(SolutionModifiers {
        group: group.unwrap_or_default(),
        having: having.unwrap_or_default(),
        order: order.unwrap_or_default(),
        limit,
        offset,
    }
    .into())
}

fn group_clause(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwGroup)?;
    ops.consume(KwBy)?;
    let conditions = ops.at_least_one(Lookahead::Rule("GroupCondition"), |ops| {
        ops.sub::<GroupCondition>("GroupCondition", &[])
    })?;
    Ok(conditions.into())
}

fn group_condition(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    if ops.at(ParenOpen) {
        ops.consume(ParenOpen)?;
        let expression: Expression = ops.sub("Expression", &[])?;
        let variable = ops.option(KwAs, |ops| {
            ops.consume(KwAs)?;
            ops.sub::<Term>("Var", &[])
        })?;
        ops.consume(ParenClose)?;
        return Ok(GroupCondition {
            expression,
            variable,
        }
        .into());
    }

    let value = ops.alternate(&[
        Alt::rule("BuiltInCall"),
        Alt::rule("FunctionCall"),
        Alt::rule("Var"),
    ])?;
    Ok(GroupCondition {
        expression: into_expression(value)?,
        variable: None,
    }
    .into())
}

fn having_clause(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwHaving)?;
    let constraints = with_mode(
        ops,
        |mode| mode.aggregates_allowed = true,
        |ops| {
            ops.at_least_one(Lookahead::Rule("Constraint"), |ops| {
                ops.sub::<Expression>("Constraint", &[])
            })
        },
    )?;
    Ok(constraints.into())
}

fn order_clause(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    ops.consume(KwOrder)?;
    ops.consume(KwBy)?;
    let conditions = with_mode(
        ops,
        |mode| mode.aggregates_allowed = true,
        |ops| {
            ops.at_least_one(Lookahead::Rule("OrderCondition"), |ops| {
                ops.sub::<OrderCondition>("OrderCondition", &[])
            })
        },
    )?;
    Ok(conditions.into())
}

fn order_condition(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    if ops.at_any(set(&[KwAsc, KwDesc])) {
        let direction = ops.consume_any(set(&[KwAsc, KwDesc]))?;
        let expression: Expression = ops.sub("BrackettedExpression", &[])?;
        return Ok(OrderCondition {
            expression,
            descending: direction.kind == KwDesc,
        }
        .into());
    }

    let value = ops.alternate(&[Alt::rule("Constraint"), Alt::rule("Var")])?;
    Ok(OrderCondition {
        expression: into_expression(value)?,
        descending: false,
    }
    .into())
}

/// `LIMIT n OFFSET m` in either order. Only `limit` and `offset` of the
/// result are set.
fn limit_offset_clauses(ops: &mut SparqlOps<'_>, _: &[bool]) -> Step {
    let mut window = SolutionModifiers::default();
    if ops.at(KwLimit) {
        window.limit = Some(ops.sub("LimitClause", &[])?);
        window.offset = ops.option(KwOffset, |ops| ops.sub::<u64>("OffsetClause", &[]))?;
    } else {
        window.offset = Some(ops.sub("OffsetClause", &[])?);
        window.limit = ops.option(KwLimit, |ops| ops.sub::<u64>("LimitClause", &[]))?;
    }
    Ok(window.into())
}

fn count(ops: &mut SparqlOps<'_>, keyword: SyntaxKind) -> Step {
    ops.consume(keyword)?;
    let token = ops.consume(Integer)?;
    let text = ops.text(&token);
    match text.parse::<u64>() {
        Ok(n) => Ok(n.into()),
        Err(_) => Err(Diagnostic::new(DiagnosticKind::InvalidInteger, token.span)
            .message(text)
            .into()),
    }
}
