//! Shared helpers for grammar tests.
//!
//! Every helper builds a fresh parser, so fresh blank nodes always start at `g_0`.

use crate::{AstPrinter, Diagnostic, Error, Result, SparqlParser};

pub fn parser() -> SparqlParser {
    SparqlParser::builder().build().unwrap()
}

pub fn dump_query(text: &str) -> String {
    let query = parser().parse_query(text).unwrap();
    AstPrinter::query(&query).with_prologue(false).dump()
}

pub fn dump_update(text: &str) -> String {
    let update = parser().parse_update(text).unwrap();
    AstPrinter::update(&update).with_prologue(false).dump()
}

pub fn dump_expression(text: &str) -> String {
    let expression = parser().parse_expression(text).unwrap();
    AstPrinter::expression(&expression).dump()
}

pub fn dump_path(text: &str) -> String {
    let (path, _) = parser().parse_path(text).unwrap();
    AstPrinter::path(&path).dump()
}

pub fn syntax_error<T: std::fmt::Debug>(result: Result<T>) -> Diagnostic {
    match result.unwrap_err() {
        Error::Syntax(diagnostic) => diagnostic,
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

pub fn query_error(text: &str) -> Diagnostic {
    syntax_error(parser().parse_query(text))
}

pub fn update_error(text: &str) -> Diagnostic {
    syntax_error(parser().parse_update(text))
}
