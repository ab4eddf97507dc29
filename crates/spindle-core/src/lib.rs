//! Spindle core: composable grammars and the engine that runs them.
//!
//! A grammar is a set of named [`Rule`]s collected in a [`Registry`]. Registries
//! compose through add/delete/patch/merge with explicit conflict resolution, so a
//! dialect can reuse a base grammar and replace only what it changes. Linking a
//! registry ([`Registry::consume_to_parser`]) checks the catalog statically and
//! produces an immutable [`Parser`] that runs ordered-choice recursive descent over a
//! token stream, threading a per-parse context through every rule.
//!
//! The engine knows nothing about any particular language; [`Language`] binds it to
//! a token vocabulary and to the value, context and error types rule bodies use.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod analysis;
mod error;
mod language;
mod parser;
mod registry;
mod rule;
pub mod shape;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod analysis_tests;
#[cfg(test)]
mod parser_tests;
#[cfg(test)]
mod registry_tests;

pub use error::{CompositionError, EngineError};
pub use language::{Language, Token, TokenSet, token_text};
pub use parser::{Alt, Lookahead, Ops, Parser, ParserConfig, RuleId};
pub use registry::Registry;
pub use rule::{Rule, RuleBody};
pub use shape::Shape;
