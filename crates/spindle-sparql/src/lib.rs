//! Spindle SPARQL: composable SPARQL 1.1 query and update parser.
//!
//! The grammar is a set of `spindle-core` rule fragments (terms, paths, expressions,
//! built-ins, patterns, triples, queries, updates) composed into linked parsers.
//! Dialects are further compositions: the `expression_only` and `path_only`
//! grammars are trimmed copies, and the `adjust` dialect merges an extra built-in
//! into the full grammar.
//!
//! # Example
//!
//! ```
//! use spindle_sparql::{AstPrinter, SparqlParser};
//!
//! let parser = SparqlParser::builder().build().expect("grammar composes");
//! let query = parser
//!     .parse_query("PREFIX ex: <http://ex.org/> SELECT * WHERE { ex:s ex:p ?o }")
//!     .expect("valid query");
//! eprintln!("{}", AstPrinter::query(&query).dump());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod ast;
pub mod context;
pub mod diagnostics;
pub mod grammar;
pub mod lexer;
mod parser;
mod syntax_kind;
pub mod terms;
pub mod value;

#[cfg(test)]
mod test_utils;


use spindle_core::{CompositionError, EngineError, Language};

pub use ast::AstPrinter;
pub use context::{ParseContext, ParseMode};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticPrinter};
pub use parser::{Dialect, Parsed, SparqlParser, SparqlParserBuilder};
pub use syntax_kind::SyntaxKind;
pub use terms::{DefaultTermFactory, TermFactory};
pub use value::Value;

/// Binds the engine to the SPARQL token vocabulary.
pub enum Sparql {}

impl Language for Sparql {
    type Kind = SyntaxKind;
    type Value = Value;
    type Context = ParseContext;
    type Error = Error;

    const EOF: SyntaxKind = SyntaxKind::Eof;

    fn kind_to_raw(kind: SyntaxKind) -> u16 {
        kind as u16
    }
}

/// Errors that can occur while composing a grammar or parsing SPARQL text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Execution fuel exhausted (too many parser operations).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("invalid base IRI: {0}")]
    InvalidBaseIri(String),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    /// Engine failures that indicate a grammar bug rather than bad input.
    #[error(transparent)]
    Engine(EngineError),

    #[error("{0}")]
    Syntax(#[from] Diagnostic),
}

impl Error {
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Error::Syntax(diagnostic) => Some(diagnostic),
            _ => None,
        }
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnexpectedToken {
                expected,
                found,
                range,
            } => Error::Syntax(
                Diagnostic::new(DiagnosticKind::UnexpectedToken, range)
                    .message(format!("{}, expected {}", found, expected)),
            ),
            EngineError::ExecFuelExhausted => Error::ExecFuelExhausted,
            EngineError::RecursionLimitExceeded => Error::RecursionLimitExceeded,
            other => Error::Engine(other),
        }
    }
}

/// Result type for SPARQL operations.
pub type Result<T> = std::result::Result<T, Error>;
