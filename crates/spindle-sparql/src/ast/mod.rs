//! Typed syntax tree produced by the SPARQL grammar.
//!
//! Terms are fully resolved: IRIs are absolute (when a base is known) and prefixed
//! names are expanded. Blank nodes carry the label chosen by the term factory.

mod printer;
mod scope;

use indexmap::IndexMap;
use serde::Serialize;

pub use printer::AstPrinter;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

pub type Prefixes = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "termType", content = "value", rename_all = "camelCase")]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal(Literal),
    /// Name without the `?`/`$` sigil.
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Literal {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub datatype: String,
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Expression {
    Term(Term),
    /// Operators and built-ins. Built-ins use their lowercase keyword.
    Operation {
        operator: &'static str,
        args: Vec<Expression>,
    },
    FunctionCall {
        function: String,
        distinct: bool,
        args: Vec<Expression>,
    },
    Aggregate(Aggregate),
    /// Right-hand side of `IN` / `NOT IN`.
    List(Vec<Expression>),
    /// `*` in `COUNT(*)`.
    Wildcard,
    /// Graph pattern argument of `EXISTS` / `NOT EXISTS`.
    Pattern(Box<Pattern>),
}

impl Expression {
    pub fn operation(operator: &'static str, args: Vec<Expression>) -> Self {
        Expression::Operation { operator, args }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    /// Lowercase aggregate keyword, e.g. `count`, `group_concat`.
    pub name: &'static str,
    pub distinct: bool,
    pub expression: Box<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PathModifier {
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl PathModifier {
    pub fn symbol(self) -> &'static str {
        match self {
            PathModifier::ZeroOrOne => "?",
            PathModifier::ZeroOrMore => "*",
            PathModifier::OneOrMore => "+",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "pathType", content = "items", rename_all = "camelCase")]
pub enum PropertyPath {
    Iri(String),
    Alternative(Vec<PropertyPath>),
    Sequence(Vec<PropertyPath>),
    Inverse(Box<PropertyPath>),
    Modified {
        modifier: PathModifier,
        path: Box<PropertyPath>,
    },
    /// A single negated element is stored bare; `!(p|q)` stores one
    /// `Alternative` item.
    NegatedSet(Vec<PropertyPath>),
}

/// Predicate position of a triple. Plain IRIs and variables stay terms even in
/// path-enabled patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Predicate {
    Term(Term),
    Path(PropertyPath),
}

impl From<PropertyPath> for Predicate {
    fn from(path: PropertyPath) -> Self {
        match path {
            PropertyPath::Iri(iri) => Predicate::Term(Term::Iri(iri)),
            path => Predicate::Path(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Predicate,
    pub object: Term,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Pattern {
    Bgp {
        triples: Vec<Triple>,
    },
    Group {
        patterns: Vec<Pattern>,
    },
    Union {
        patterns: Vec<Pattern>,
    },
    Optional {
        patterns: Vec<Pattern>,
    },
    Minus {
        patterns: Vec<Pattern>,
    },
    Graph {
        name: Term,
        patterns: Vec<Pattern>,
    },
    Service {
        name: Term,
        silent: bool,
        patterns: Vec<Pattern>,
    },
    Filter {
        expression: Expression,
    },
    Bind {
        variable: Term,
        expression: Expression,
    },
    Values {
        values: ValuesBlock,
    },
    SubQuery {
        query: Box<Query>,
    },
}

/// Inline data. `None` cells are `UNDEF`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValuesBlock {
    pub variables: Vec<Term>,
    pub rows: Vec<Vec<Option<Term>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub prefixes: Prefixes,
    pub form: QueryForm,
    #[serde(skip_serializing_if = "Dataset::is_empty")]
    pub dataset: Dataset,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Vec<Pattern>>,
    pub modifiers: SolutionModifiers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<ValuesBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "queryType", rename_all = "camelCase")]
pub enum QueryForm {
    Select {
        distinct: bool,
        reduced: bool,
        projection: Projection,
    },
    Construct {
        template: Vec<Triple>,
    },
    Describe {
        targets: Projection,
    },
    Ask,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Projection {
    Wildcard,
    Items(Vec<ProjectionItem>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProjectionItem {
    /// A variable, or an IRI in DESCRIBE.
    Term(Term),
    Bound {
        expression: Expression,
        variable: Term,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub default: Vec<String>,
    pub named: Vec<String>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.default.is_empty() && self.named.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SolutionModifiers {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<GroupCondition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub having: Vec<Expression>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<OrderCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl SolutionModifiers {
    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
            && self.having.is_empty()
            && self.order.is_empty()
            && self.limit.is_none()
            && self.offset.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCondition {
    pub expression: Expression,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<Term>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCondition {
    pub expression: Expression,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub prefixes: Prefixes,
    pub operations: Vec<UpdateOperation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UpdateOperation {
    InsertData {
        data: Vec<Quads>,
    },
    DeleteData {
        data: Vec<Quads>,
    },
    DeleteWhere {
        patterns: Vec<Quads>,
    },
    Modify {
        #[serde(skip_serializing_if = "Option::is_none")]
        with: Option<String>,
        delete: Vec<Quads>,
        insert: Vec<Quads>,
        #[serde(skip_serializing_if = "Dataset::is_empty")]
        using: Dataset,
        #[serde(rename = "where")]
        where_clause: Vec<Pattern>,
    },
    Load {
        silent: bool,
        source: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        destination: Option<String>,
    },
    Clear {
        silent: bool,
        target: GraphTarget,
    },
    Drop {
        silent: bool,
        target: GraphTarget,
    },
    Create {
        silent: bool,
        graph: String,
    },
    Add {
        silent: bool,
        from: GraphTarget,
        to: GraphTarget,
    },
    Move {
        silent: bool,
        from: GraphTarget,
        to: GraphTarget,
    },
    Copy {
        silent: bool,
        from: GraphTarget,
        to: GraphTarget,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "camelCase")]
pub enum GraphTarget {
    Default,
    /// Every named graph (`NAMED`).
    Named,
    All,
    Graph(String),
}

/// Triples of one graph in an update template or data block. `None` is the
/// default graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quads {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<Term>,
    pub triples: Vec<Triple>,
}
