//! Variable scoping over the syntax tree.

use indexmap::IndexSet;

use super::{Expression, Pattern, Predicate, Projection, ProjectionItem, Query, QueryForm, Term, Triple};

fn add_term(term: &Term, out: &mut IndexSet<String>) {
    if let Term::Variable(name) = term {
        out.insert(name.clone());
    }
}

impl Triple {
    pub fn variables(&self, out: &mut IndexSet<String>) {
        add_term(&self.subject, out);
        if let Predicate::Term(term) = &self.predicate {
            add_term(term, out);
        }
        add_term(&self.object, out);
    }
}

impl Pattern {
    /// Variables this pattern binds for the patterns that follow it in a group.
    pub fn in_scope_variables(&self, out: &mut IndexSet<String>) {
        match self {
            Pattern::Bgp { triples } => {
                for triple in triples {
                    triple.variables(out);
                }
            }
            Pattern::Group { patterns }
            | Pattern::Union { patterns }
            | Pattern::Optional { patterns } => {
                for pattern in patterns {
                    pattern.in_scope_variables(out);
                }
            }
            Pattern::Graph { name, patterns } | Pattern::Service { name, patterns, .. } => {
                add_term(name, out);
                for pattern in patterns {
                    pattern.in_scope_variables(out);
                }
            }
            Pattern::Bind { variable, .. } => add_term(variable, out),
            Pattern::Values { values } => {
                for variable in &values.variables {
                    add_term(variable, out);
                }
            }
            Pattern::SubQuery { query } => query.projected_variables(out),
            Pattern::Minus { .. } | Pattern::Filter { .. } => {}
        }
    }
}

impl Query {
    /// Variables visible outside this query when it is used as a sub-select.
    pub fn projected_variables(&self, out: &mut IndexSet<String>) {
        match &self.form {
            QueryForm::Select {
                projection: Projection::Items(items),
                ..
            } => {
                for item in items {
                    match item {
                        ProjectionItem::Term(term) => add_term(term, out),
                        ProjectionItem::Bound { variable, .. } => add_term(variable, out),
                    }
                }
            }
            _ => {
                for pattern in self.where_clause.iter().flatten() {
                    pattern.in_scope_variables(out);
                }
            }
        }
    }
}

impl Expression {
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expression::Aggregate(_) => true,
            Expression::Operation { args, .. }
            | Expression::FunctionCall { args, .. }
            | Expression::List(args) => args.iter().any(Expression::contains_aggregate),
            Expression::Term(_) | Expression::Wildcard | Expression::Pattern(_) => false,
        }
    }

    /// Variables referenced outside of aggregates and `EXISTS` patterns.
    pub fn free_variables(&self, out: &mut IndexSet<String>) {
        match self {
            Expression::Term(term) => add_term(term, out),
            Expression::Operation { args, .. }
            | Expression::FunctionCall { args, .. }
            | Expression::List(args) => {
                for arg in args {
                    arg.free_variables(out);
                }
            }
            Expression::Aggregate(_) | Expression::Wildcard | Expression::Pattern(_) => {}
        }
    }
}
