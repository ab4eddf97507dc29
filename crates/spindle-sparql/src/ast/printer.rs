//! Indented dump of parsed queries, updates, paths and expressions.

use std::fmt::{self, Write};

use super::{
    Expression, GraphTarget, Literal, PathModifier, Pattern, Predicate, Projection, ProjectionItem,
    PropertyPath, Quads, Query, QueryForm, Term, Triple, Update, UpdateOperation, ValuesBlock,
    XSD_STRING,
};

const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

enum Target<'a> {
    Query(&'a Query),
    Update(&'a Update),
    Path(&'a PropertyPath),
    Expression(&'a Expression),
}

pub struct AstPrinter<'a> {
    target: Target<'a>,
    prologue: bool,
}

impl<'a> AstPrinter<'a> {
    pub fn query(query: &'a Query) -> Self {
        Self::new(Target::Query(query))
    }

    pub fn update(update: &'a Update) -> Self {
        Self::new(Target::Update(update))
    }

    pub fn path(path: &'a PropertyPath) -> Self {
        Self::new(Target::Path(path))
    }

    pub fn expression(expression: &'a Expression) -> Self {
        Self::new(Target::Expression(expression))
    }

    fn new(target: Target<'a>) -> Self {
        Self {
            target,
            prologue: true,
        }
    }

    /// Include `Base`/`Prefix` lines (default: on).
    pub fn with_prologue(mut self, value: bool) -> Self {
        self.prologue = value;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> fmt::Result {
        match self.target {
            Target::Query(query) => self.format_query(query, 0, w),
            Target::Update(update) => self.format_update(update, w),
            Target::Path(path) => format_path(path, 0, w),
            Target::Expression(expr) => self.format_expr(expr, 0, w),
        }
    }

    fn format_prologue(
        &self,
        base: Option<&str>,
        prefixes: &super::Prefixes,
        indent: usize,
        w: &mut impl Write,
    ) -> fmt::Result {
        if !self.prologue {
            return Ok(());
        }
        let prefix = "  ".repeat(indent);
        if let Some(base) = base {
            writeln!(w, "{}Base <{}>", prefix, base)?;
        }
        for (name, iri) in prefixes {
            writeln!(w, "{}Prefix {}: <{}>", prefix, name, iri)?;
        }
        Ok(())
    }

    fn format_query(&self, query: &Query, indent: usize, w: &mut impl Write) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        let inner = "  ".repeat(indent + 1);

        match &query.form {
            QueryForm::Select {
                distinct, reduced, ..
            } => {
                let modifier = if *distinct {
                    " DISTINCT"
                } else if *reduced {
                    " REDUCED"
                } else {
                    ""
                };
                writeln!(w, "{}Select{}", prefix, modifier)?;
            }
            QueryForm::Construct { .. } => writeln!(w, "{}Construct", prefix)?,
            QueryForm::Describe { .. } => writeln!(w, "{}Describe", prefix)?,
            QueryForm::Ask => writeln!(w, "{}Ask", prefix)?,
        }

        self.format_prologue(query.base.as_deref(), &query.prefixes, indent + 1, w)?;

        match &query.form {
            QueryForm::Select { projection, .. } => {
                self.format_projection("Projection", projection, indent + 1, w)?
            }
            QueryForm::Describe { targets } => {
                self.format_projection("Targets", targets, indent + 1, w)?
            }
            QueryForm::Construct { template } => {
                writeln!(w, "{}Template", inner)?;
                format_triples(template, indent + 2, w)?;
            }
            QueryForm::Ask => {}
        }

        for iri in &query.dataset.default {
            writeln!(w, "{}From <{}>", inner, iri)?;
        }
        for iri in &query.dataset.named {
            writeln!(w, "{}FromNamed <{}>", inner, iri)?;
        }

        if let Some(patterns) = &query.where_clause {
            writeln!(w, "{}Where", inner)?;
            for pattern in patterns {
                self.format_pattern(pattern, indent + 2, w)?;
            }
        }

        let modifiers = &query.modifiers;
        if !modifiers.group.is_empty() {
            writeln!(w, "{}GroupBy", inner)?;
            for cond in &modifiers.group {
                match &cond.variable {
                    Some(var) => {
                        writeln!(w, "{}  As {}", inner, var)?;
                        self.format_expr(&cond.expression, indent + 3, w)?;
                    }
                    None => self.format_expr(&cond.expression, indent + 2, w)?,
                }
            }
        }
        if !modifiers.having.is_empty() {
            writeln!(w, "{}Having", inner)?;
            for expr in &modifiers.having {
                self.format_expr(expr, indent + 2, w)?;
            }
        }
        if !modifiers.order.is_empty() {
            writeln!(w, "{}OrderBy", inner)?;
            for cond in &modifiers.order {
                let dir = if cond.descending { "Desc" } else { "Asc" };
                writeln!(w, "{}  {}", inner, dir)?;
                self.format_expr(&cond.expression, indent + 3, w)?;
            }
        }
        if let Some(limit) = modifiers.limit {
            writeln!(w, "{}Limit {}", inner, limit)?;
        }
        if let Some(offset) = modifiers.offset {
            writeln!(w, "{}Offset {}", inner, offset)?;
        }
        if let Some(values) = &query.values {
            format_values(values, indent + 1, w)?;
        }
        Ok(())
    }

    fn format_projection(
        &self,
        label: &str,
        projection: &Projection,
        indent: usize,
        w: &mut impl Write,
    ) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        let items = match projection {
            Projection::Wildcard => return writeln!(w, "{}{} *", prefix, label),
            Projection::Items(items) => items,
        };
        writeln!(w, "{}{}", prefix, label)?;
        for item in items {
            match item {
                ProjectionItem::Term(term) => writeln!(w, "{}  {}", prefix, term)?,
                ProjectionItem::Bound {
                    expression,
                    variable,
                } => {
                    writeln!(w, "{}  Bind {}", prefix, variable)?;
                    self.format_expr(expression, indent + 2, w)?;
                }
            }
        }
        Ok(())
    }

    fn format_pattern(&self, pattern: &Pattern, indent: usize, w: &mut impl Write) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match pattern {
            Pattern::Bgp { triples } => {
                writeln!(w, "{}Bgp", prefix)?;
                format_triples(triples, indent + 1, w)
            }
            Pattern::Group { patterns } => self.format_group("Group", patterns, indent, w),
            Pattern::Union { patterns } => self.format_group("Union", patterns, indent, w),
            Pattern::Optional { patterns } => self.format_group("Optional", patterns, indent, w),
            Pattern::Minus { patterns } => self.format_group("Minus", patterns, indent, w),
            Pattern::Graph { name, patterns } => {
                self.format_group(&format!("Graph {}", name), patterns, indent, w)
            }
            Pattern::Service {
                name,
                silent,
                patterns,
            } => {
                let silent = if *silent { " SILENT" } else { "" };
                self.format_group(&format!("Service{} {}", silent, name), patterns, indent, w)
            }
            Pattern::Filter { expression } => {
                writeln!(w, "{}Filter", prefix)?;
                self.format_expr(expression, indent + 1, w)
            }
            Pattern::Bind {
                variable,
                expression,
            } => {
                writeln!(w, "{}Bind {}", prefix, variable)?;
                self.format_expr(expression, indent + 1, w)
            }
            Pattern::Values { values } => format_values(values, indent, w),
            Pattern::SubQuery { query } => self.format_query(query, indent, w),
        }
    }

    fn format_group(
        &self,
        label: &str,
        patterns: &[Pattern],
        indent: usize,
        w: &mut impl Write,
    ) -> fmt::Result {
        writeln!(w, "{}{}", "  ".repeat(indent), label)?;
        for pattern in patterns {
            self.format_pattern(pattern, indent + 1, w)?;
        }
        Ok(())
    }

    fn format_expr(&self, expr: &Expression, indent: usize, w: &mut impl Write) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match expr {
            Expression::Term(term) => writeln!(w, "{}{}", prefix, term),
            Expression::Operation { operator, args } => {
                writeln!(w, "{}Op {}", prefix, operator)?;
                self.format_exprs(args, indent + 1, w)
            }
            Expression::FunctionCall {
                function,
                distinct,
                args,
            } => {
                let distinct = if *distinct { " DISTINCT" } else { "" };
                writeln!(w, "{}Call <{}>{}", prefix, function, distinct)?;
                self.format_exprs(args, indent + 1, w)
            }
            Expression::Aggregate(agg) => {
                write!(w, "{}Aggregate {}", prefix, agg.name)?;
                if agg.distinct {
                    write!(w, " DISTINCT")?;
                }
                if let Some(sep) = &agg.separator {
                    write!(w, " SEPARATOR {:?}", sep)?;
                }
                writeln!(w)?;
                self.format_expr(&agg.expression, indent + 1, w)
            }
            Expression::List(items) => {
                writeln!(w, "{}List", prefix)?;
                self.format_exprs(items, indent + 1, w)
            }
            Expression::Wildcard => writeln!(w, "{}*", prefix),
            Expression::Pattern(pattern) => self.format_pattern(pattern, indent, w),
        }
    }

    fn format_exprs(&self, exprs: &[Expression], indent: usize, w: &mut impl Write) -> fmt::Result {
        for expr in exprs {
            self.format_expr(expr, indent, w)?;
        }
        Ok(())
    }

    fn format_update(&self, update: &Update, w: &mut impl Write) -> fmt::Result {
        writeln!(w, "Update")?;
        self.format_prologue(update.base.as_deref(), &update.prefixes, 1, w)?;
        for op in &update.operations {
            self.format_operation(op, 1, w)?;
        }
        Ok(())
    }

    fn format_operation(
        &self,
        op: &UpdateOperation,
        indent: usize,
        w: &mut impl Write,
    ) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        let silent = |s: bool| if s { " SILENT" } else { "" };
        match op {
            UpdateOperation::InsertData { data } => {
                writeln!(w, "{}InsertData", prefix)?;
                format_quads(data, indent + 1, w)
            }
            UpdateOperation::DeleteData { data } => {
                writeln!(w, "{}DeleteData", prefix)?;
                format_quads(data, indent + 1, w)
            }
            UpdateOperation::DeleteWhere { patterns } => {
                writeln!(w, "{}DeleteWhere", prefix)?;
                format_quads(patterns, indent + 1, w)
            }
            UpdateOperation::Modify {
                with,
                delete,
                insert,
                using,
                where_clause,
            } => {
                writeln!(w, "{}Modify", prefix)?;
                if let Some(with) = with {
                    writeln!(w, "{}  With <{}>", prefix, with)?;
                }
                if !delete.is_empty() {
                    writeln!(w, "{}  Delete", prefix)?;
                    format_quads(delete, indent + 2, w)?;
                }
                if !insert.is_empty() {
                    writeln!(w, "{}  Insert", prefix)?;
                    format_quads(insert, indent + 2, w)?;
                }
                for iri in &using.default {
                    writeln!(w, "{}  Using <{}>", prefix, iri)?;
                }
                for iri in &using.named {
                    writeln!(w, "{}  UsingNamed <{}>", prefix, iri)?;
                }
                writeln!(w, "{}  Where", prefix)?;
                for pattern in where_clause {
                    self.format_pattern(pattern, indent + 2, w)?;
                }
                Ok(())
            }
            UpdateOperation::Load {
                silent: s,
                source,
                destination,
            } => {
                write!(w, "{}Load{} <{}>", prefix, silent(*s), source)?;
                if let Some(dest) = destination {
                    write!(w, " INTO <{}>", dest)?;
                }
                writeln!(w)
            }
            UpdateOperation::Clear { silent: s, target } => {
                writeln!(w, "{}Clear{} {}", prefix, silent(*s), target)
            }
            UpdateOperation::Drop { silent: s, target } => {
                writeln!(w, "{}Drop{} {}", prefix, silent(*s), target)
            }
            UpdateOperation::Create { silent: s, graph } => {
                writeln!(w, "{}Create{} <{}>", prefix, silent(*s), graph)
            }
            UpdateOperation::Add {
                silent: s,
                from,
                to,
            } => writeln!(w, "{}Add{} {} TO {}", prefix, silent(*s), from, to),
            UpdateOperation::Move {
                silent: s,
                from,
                to,
            } => writeln!(w, "{}Move{} {} TO {}", prefix, silent(*s), from, to),
            UpdateOperation::Copy {
                silent: s,
                from,
                to,
            } => writeln!(w, "{}Copy{} {} TO {}", prefix, silent(*s), from, to),
        }
    }
}

fn format_triples(triples: &[Triple], indent: usize, w: &mut impl Write) -> fmt::Result {
    let prefix = "  ".repeat(indent);
    for triple in triples {
        writeln!(w, "{}{}", prefix, triple)?;
    }
    Ok(())
}

fn format_quads(quads: &[Quads], indent: usize, w: &mut impl Write) -> fmt::Result {
    let prefix = "  ".repeat(indent);
    for block in quads {
        match &block.graph {
            Some(graph) => writeln!(w, "{}Graph {}", prefix, graph)?,
            None => writeln!(w, "{}Triples", prefix)?,
        }
        format_triples(&block.triples, indent + 1, w)?;
    }
    Ok(())
}

fn format_values(values: &ValuesBlock, indent: usize, w: &mut impl Write) -> fmt::Result {
    let prefix = "  ".repeat(indent);
    write!(w, "{}Values", prefix)?;
    for var in &values.variables {
        write!(w, " {}", var)?;
    }
    writeln!(w)?;
    for row in &values.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| cell.as_ref().map_or_else(|| "UNDEF".to_string(), Term::to_string))
            .collect();
        writeln!(w, "{}  ({})", prefix, cells.join(" "))?;
    }
    Ok(())
}

fn format_path(path: &PropertyPath, indent: usize, w: &mut impl Write) -> fmt::Result {
    let prefix = "  ".repeat(indent);
    let (label, children): (String, &[PropertyPath]) = match path {
        PropertyPath::Iri(iri) => return writeln!(w, "{}<{}>", prefix, iri),
        PropertyPath::Alternative(items) => ("Alt".to_string(), items),
        PropertyPath::Sequence(items) => ("Seq".to_string(), items),
        PropertyPath::Inverse(inner) => ("Inverse".to_string(), std::slice::from_ref(&**inner)),
        PropertyPath::Modified { modifier, path } => {
            (format!("Mod {}", modifier.symbol()), std::slice::from_ref(&**path))
        }
        PropertyPath::NegatedSet(items) => ("Negated".to_string(), items),
    };
    writeln!(w, "{}{}", prefix, label)?;
    for child in children {
        format_path(child, indent + 1, w)?;
    }
    Ok(())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Blank(label) => write!(f, "_:{}", label),
            Term::Variable(name) => write!(f, "?{}", name),
            Term::Literal(lit) => lit.fmt(f),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        for c in self.value.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c => f.write_char(c)?,
            }
        }
        f.write_char('"')?;
        if let Some(lang) = &self.language {
            return write!(f, "@{}", lang);
        }
        if self.datatype == XSD_STRING {
            return Ok(());
        }
        match self.datatype.strip_prefix(XSD) {
            Some(local) => write!(f, "^^xsd:{}", local),
            None => write!(f, "^^<{}>", self.datatype),
        }
    }
}

/// Compact functional notation used inside triples.
impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, items): (&str, &[PropertyPath]) = match self {
            PropertyPath::Iri(iri) => return write!(f, "<{}>", iri),
            PropertyPath::Alternative(items) => ("Alt", items),
            PropertyPath::Sequence(items) => ("Seq", items),
            PropertyPath::Inverse(inner) => ("Inverse", std::slice::from_ref(&**inner)),
            PropertyPath::Modified { modifier, path } => {
                let name = match modifier {
                    PathModifier::ZeroOrOne => "ZeroOrOne",
                    PathModifier::ZeroOrMore => "ZeroOrMore",
                    PathModifier::OneOrMore => "OneOrMore",
                };
                (name, std::slice::from_ref(&**path))
            }
            PropertyPath::NegatedSet(items) => ("Negated", items),
        };
        write!(f, "{}(", name)?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            item.fmt(f)?;
        }
        f.write_char(')')
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Term(term) => term.fmt(f),
            Predicate::Path(path) => path.fmt(f),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

impl fmt::Display for GraphTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphTarget::Default => f.write_str("DEFAULT"),
            GraphTarget::Named => f.write_str("NAMED"),
            GraphTarget::All => f.write_str("ALL"),
            GraphTarget::Graph(iri) => write!(f, "GRAPH <{}>", iri),
        }
    }
}
