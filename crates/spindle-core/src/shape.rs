//! Declarative outline of a rule body.
//!
//! Bodies are opaque closures, so every rule also carries a `Shape` describing the
//! tokens it may consume and the rules it may call, in order. Linking derives
//! nullability, FIRST sets, reachability and left-recursion from shapes alone, and
//! the runtime refuses calls to rules a shape does not mention.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape<K> {
    /// Matches without consuming anything.
    Empty,
    Token(K),
    Rule(&'static str),
    Seq(Vec<Shape<K>>),
    /// Ordered alternatives, first match wins.
    Alt(Vec<Shape<K>>),
    Opt(Box<Shape<K>>),
    Many(Box<Shape<K>>),
    AtLeastOne(Box<Shape<K>>),
    /// Alternative guarded by a runtime predicate. Excluded from ambiguity checks.
    Gated(Box<Shape<K>>),
}

pub fn tok<K>(kind: K) -> Shape<K> {
    Shape::Token(kind)
}

pub fn rule<K>(name: &'static str) -> Shape<K> {
    Shape::Rule(name)
}

pub fn seq<K>(items: impl IntoIterator<Item = Shape<K>>) -> Shape<K> {
    Shape::Seq(items.into_iter().collect())
}

pub fn alt<K>(items: impl IntoIterator<Item = Shape<K>>) -> Shape<K> {
    Shape::Alt(items.into_iter().collect())
}

pub fn opt<K>(inner: Shape<K>) -> Shape<K> {
    Shape::Opt(Box::new(inner))
}

pub fn many<K>(inner: Shape<K>) -> Shape<K> {
    Shape::Many(Box::new(inner))
}

pub fn many1<K>(inner: Shape<K>) -> Shape<K> {
    Shape::AtLeastOne(Box::new(inner))
}

pub fn gated<K>(inner: Shape<K>) -> Shape<K> {
    Shape::Gated(Box::new(inner))
}

/// `item (sep item)*`
pub fn sep_by1<K: Clone>(item: Shape<K>, sep: K) -> Shape<K> {
    seq([item.clone(), many(seq([tok(sep), item]))])
}

impl<K: Copy> Shape<K> {
    /// Rule names referenced anywhere in the shape, in order of appearance.
    pub fn refs(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs(&self, out: &mut Vec<&'static str>) {
        match self {
            Shape::Empty | Shape::Token(_) => {}
            Shape::Rule(name) => {
                if !out.contains(name) {
                    out.push(*name);
                }
            }
            Shape::Seq(items) | Shape::Alt(items) => {
                for item in items {
                    item.collect_refs(out);
                }
            }
            Shape::Opt(inner)
            | Shape::Many(inner)
            | Shape::AtLeastOne(inner)
            | Shape::Gated(inner) => inner.collect_refs(out),
        }
    }

    /// Token kinds mentioned anywhere in the shape.
    pub fn tokens(&self) -> Vec<K> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens(&self, out: &mut Vec<K>) {
        match self {
            Shape::Empty | Shape::Rule(_) => {}
            Shape::Token(kind) => out.push(*kind),
            Shape::Seq(items) | Shape::Alt(items) => {
                for item in items {
                    item.collect_tokens(out);
                }
            }
            Shape::Opt(inner)
            | Shape::Many(inner)
            | Shape::AtLeastOne(inner)
            | Shape::Gated(inner) => inner.collect_tokens(out),
        }
    }
}
