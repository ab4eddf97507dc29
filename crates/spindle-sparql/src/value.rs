//! Uniform return value of SPARQL rule bodies.
//!
//! Every payload type appears in exactly one variant, which is what lets
//! `Ops::sub::<T>` pick the variant from the requested type alone.

use rowan::TextRange;

use crate::ast::{
    Expression, GraphTarget, GroupCondition, OrderCondition, PathModifier, Pattern, Predicate,
    Projection, PropertyPath, Quads, Query, SolutionModifiers, Term, Triple, Update,
    UpdateOperation, ValuesBlock,
};

/// A term in object or subject position plus the triples its nested syntax
/// (collections, `[ ... ]`) desugared to.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub term: Term,
    pub triples: Vec<Triple>,
}

impl Node {
    pub fn bare(term: Term) -> Self {
        Self {
            term,
            triples: Vec::new(),
        }
    }
}

/// Output of a property list whose subject is not known yet.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingTriple {
    /// Needs the subject.
    Direct { predicate: Predicate, object: Term },
    /// Generated by nested syntax, already complete.
    Complete(Triple),
}

impl PendingTriple {
    pub fn apply(self, subject: &Term) -> Triple {
        match self {
            PendingTriple::Direct { predicate, object } => Triple {
                subject: subject.clone(),
                predicate,
                object,
            },
            PendingTriple::Complete(triple) => triple,
        }
    }
}

/// Arguments of a function call.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgList {
    pub distinct: bool,
    pub args: Vec<Expression>,
}

/// Projection of a SELECT clause, with the span of each item for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectClause {
    pub distinct: bool,
    pub reduced: bool,
    pub projection: Projection,
    pub spans: Vec<TextRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetClause {
    pub named: bool,
    pub iri: String,
}

/// Variants after `boxed` hold their payload behind a `Box`.
macro_rules! values {
    (
        $($variant:ident($ty:ty)),* ;
        boxed $($boxed:ident($boxed_ty:ty)),* $(,)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum Value {
            Unit,
            $($variant($ty),)*
            $($boxed(Box<$boxed_ty>),)*
        }

        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }

            impl TryFrom<Value> for $ty {
                type Error = Value;

                fn try_from(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*

        $(
            impl From<$boxed_ty> for Value {
                fn from(value: $boxed_ty) -> Self {
                    Value::$boxed(Box::new(value))
                }
            }

            impl TryFrom<Value> for $boxed_ty {
                type Error = Value;

                fn try_from(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$boxed(inner) => Ok(*inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

values! {
    Flag(bool),
    Number(u64),
    Str(String),
    Term(Term),
    Terms(Vec<Term>),
    Cell(Option<Term>),
    Row(Vec<Option<Term>>),
    Expression(Expression),
    Expressions(Vec<Expression>),
    ArgList(ArgList),
    Path(PropertyPath),
    Paths(Vec<PropertyPath>),
    Modifier(PathModifier),
    Predicate(Predicate),
    Node(Node),
    Nodes(Vec<Node>),
    Pending(Vec<PendingTriple>),
    Triples(Vec<Triple>),
    Patterns(Vec<Pattern>),
    Dataset(DatasetClause),
    GroupConditions(Vec<GroupCondition>),
    OrderConditions(Vec<OrderCondition>),
    Quads(Vec<Quads>),
    Target(GraphTarget);
    boxed
    Pattern(Pattern),
    Values(ValuesBlock),
    Select(SelectClause),
    Modifiers(SolutionModifiers),
    GroupCondition(GroupCondition),
    OrderCondition(OrderCondition),
    Query(Query),
    Update(Update),
    Operation(UpdateOperation),
    GraphQuads(Quads),
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl TryFrom<Value> for () {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Value> {
        match value {
            Value::Unit => Ok(()),
            other => Err(other),
        }
    }
}
