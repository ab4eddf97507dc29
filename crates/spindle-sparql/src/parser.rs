//! Public parser facade.
//!
//! A [`SparqlParser`] owns three linked grammars (the selected dialect, the
//! expression-only grammar and the path-only grammar) behind an `Arc`, plus the
//! settings every parse seeds its [`ParseContext`] with. Cloning it is cheap.

use std::sync::Arc;

use oxiri::Iri;
use spindle_core::{Parser, ParserConfig};

use crate::ast::{Expression, Prefixes, PropertyPath, Query, Update};
use crate::context::ParseContext;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::lexer::{Token, lex};
use crate::terms::{DefaultTermFactory, TermFactory};
use crate::value::Value;
use crate::{Error, Result, Sparql, SyntaxKind, grammar};

/// Grammar variant used for queries and updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    Sparql11,
    /// SPARQL 1.1 plus the `ADJUST(expression, expression)` built-in.
    Adjust,
}

/// Result of [`SparqlParser::parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Query(Query),
    Update(Update),
}

struct Grammars {
    dialect: Parser<Sparql>,
    expression: Parser<Sparql>,
    path: Parser<Sparql>,
}

/// Builder for [`SparqlParser`].
pub struct SparqlParserBuilder {
    base_iri: Option<String>,
    prefixes: Prefixes,
    factory: Option<Arc<dyn TermFactory>>,
    strict_blank_node_scope: bool,
    config: ParserConfig,
    dialect: Dialect,
}

impl Default for SparqlParserBuilder {
    fn default() -> Self {
        Self {
            base_iri: None,
            prefixes: Prefixes::new(),
            factory: None,
            strict_blank_node_scope: false,
            config: ParserConfig::default(),
            dialect: Dialect::default(),
        }
    }
}

impl SparqlParserBuilder {
    /// Base IRI in effect before any `BASE` declaration.
    pub fn with_base_iri(mut self, iri: impl Into<String>) -> Self {
        self.base_iri = Some(iri.into());
        self
    }

    /// Pre-declared prefix. `PREFIX` in the text overrides it.
    pub fn with_prefix(mut self, name: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.insert(name.into(), iri.into());
        self
    }

    pub fn with_term_factory(mut self, factory: Arc<dyn TermFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Reject a blank node label reused by a later operation of the same
    /// update request.
    pub fn with_strict_blank_node_scope(mut self, strict: bool) -> Self {
        self.strict_blank_node_scope = strict;
        self
    }

    pub fn with_exec_fuel(mut self, fuel: Option<u32>) -> Self {
        self.config = self.config.with_exec_fuel(fuel);
        self
    }

    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.config = self.config.with_max_depth(limit);
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Composes and links the grammars.
    pub fn build(self) -> Result<SparqlParser> {
        let base_iri = match self.base_iri {
            Some(iri) => Some(
                Iri::parse(iri.clone())
                    .map_err(|e| Error::InvalidBaseIri(format!("<{}>: {}", iri, e)))?,
            ),
            None => None,
        };

        let registry = match self.dialect {
            Dialect::Sparql11 => grammar::sparql_1_1()?,
            Dialect::Adjust => grammar::adjust()?,
        };
        let grammars = Grammars {
            dialect: grammar::link(registry, self.config)?,
            expression: grammar::link(grammar::expression_only()?, self.config)?,
            path: grammar::link(grammar::path_only()?, self.config)?,
        };
        tracing::debug!(dialect = ?self.dialect, "built SPARQL parser");

        Ok(SparqlParser {
            grammars: Arc::new(grammars),
            factory: self
                .factory
                .unwrap_or_else(|| Arc::new(DefaultTermFactory::new())),
            base_iri,
            prefixes: self.prefixes,
            strict_blank_node_scope: self.strict_blank_node_scope,
        })
    }
}

/// SPARQL 1.1 query and update parser.
#[derive(Clone)]
pub struct SparqlParser {
    grammars: Arc<Grammars>,
    factory: Arc<dyn TermFactory>,
    base_iri: Option<Iri<String>>,
    prefixes: Prefixes,
    strict_blank_node_scope: bool,
}

impl std::fmt::Debug for SparqlParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparqlParser")
            .field("base_iri", &self.base_iri.as_ref().map(|iri| iri.as_str()))
            .field("prefixes", &self.prefixes)
            .field("strict_blank_node_scope", &self.strict_blank_node_scope)
            .finish_non_exhaustive()
    }
}

impl SparqlParser {
    pub fn builder() -> SparqlParserBuilder {
        SparqlParserBuilder::default()
    }

    /// Parses a query or an update, decided by the first keyword after the
    /// prologue.
    pub fn parse(&self, text: &str) -> Result<Parsed> {
        let tokens = tokenize(text)?;
        if is_query(&tokens) {
            let value = self.run_dialect("QueryUnit", text, &tokens)?;
            Ok(Parsed::Query(into("QueryUnit", value)?))
        } else {
            let value = self.run_dialect("UpdateUnit", text, &tokens)?;
            Ok(Parsed::Update(into("UpdateUnit", value)?))
        }
    }

    pub fn parse_query(&self, text: &str) -> Result<Query> {
        let tokens = tokenize(text)?;
        let value = self.run_dialect("QueryUnit", text, &tokens)?;
        into("QueryUnit", value)
    }

    pub fn parse_update(&self, text: &str) -> Result<Update> {
        let tokens = tokenize(text)?;
        let value = self.run_dialect("UpdateUnit", text, &tokens)?;
        into("UpdateUnit", value)
    }

    /// Parses one expression. Aggregates are accepted; `EXISTS` is not.
    pub fn parse_expression(&self, text: &str) -> Result<Expression> {
        let tokens = tokenize(text)?;
        let mut ctx = self.context();
        ctx.mode.aggregates_allowed = true;
        let value = run(&self.grammars.expression, "Expression", text, &tokens, ctx)?;
        into("Expression", value)
    }

    /// Parses one property path. The prefix map is always empty; it is there
    /// so callers can treat the result like a query's.
    pub fn parse_path(&self, text: &str) -> Result<(PropertyPath, Prefixes)> {
        let tokens = tokenize(text)?;
        let value = run(&self.grammars.path, "Path", text, &tokens, self.context())?;
        Ok((into("Path", value)?, Prefixes::new()))
    }

    /// Restarts fresh blank node numbering.
    pub fn reset_blank_nodes(&self) {
        self.factory.reset();
    }

    fn context(&self) -> ParseContext {
        ParseContext::new(self.factory.clone())
            .with_base_iri(self.base_iri.clone())
            .with_prefixes(self.prefixes.clone())
            .with_strict_blank_node_scope(self.strict_blank_node_scope)
    }

    fn run_dialect(&self, entry: &'static str, text: &str, tokens: &[Token]) -> Result<Value> {
        run(&self.grammars.dialect, entry, text, tokens, self.context())
    }
}

fn run(
    parser: &Parser<Sparql>,
    entry: &'static str,
    text: &str,
    tokens: &[Token],
    mut ctx: ParseContext,
) -> Result<Value> {
    tracing::debug!(entry, tokens = tokens.len(), "parse start");
    let result = parser.parse_with(entry, text, tokens, &mut ctx);
    match &result {
        Ok(_) => tracing::debug!(entry, "parse finished"),
        Err(err) => tracing::debug!(entry, error = %err, "parse failed"),
    }
    result
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let tokens = lex(text);
    if let Some(garbage) = tokens.iter().find(|t| t.kind == SyntaxKind::Garbage) {
        let snippet = &text[garbage.span];
        return Err(Diagnostic::new(DiagnosticKind::UnrecognizedInput, garbage.span)
            .message(snippet)
            .into());
    }
    Ok(tokens)
}

/// Skips `BASE <iri>` and `PREFIX p: <iri>` declarations and looks at the
/// keyword that follows.
fn is_query(tokens: &[Token]) -> bool {
    let mut rest = tokens;
    loop {
        match rest.first().map(|t| t.kind) {
            Some(SyntaxKind::KwBase) => rest = rest.get(2..).unwrap_or_default(),
            Some(SyntaxKind::KwPrefix) => rest = rest.get(3..).unwrap_or_default(),
            Some(kind) => {
                return matches!(
                    kind,
                    SyntaxKind::KwSelect
                        | SyntaxKind::KwConstruct
                        | SyntaxKind::KwDescribe
                        | SyntaxKind::KwAsk
                );
            }
            None => return false,
        }
    }
}

fn into<T: TryFrom<Value>>(entry: &str, value: Value) -> Result<T> {
    grammar::expect(entry, value)
}
