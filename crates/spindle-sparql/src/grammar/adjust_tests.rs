use crate::test_utils::{query_error, syntax_error};
use crate::{AstPrinter, Dialect, DiagnosticKind, SparqlParser};

fn adjust_parser() -> SparqlParser {
    SparqlParser::builder()
        .with_dialect(Dialect::Adjust)
        .build()
        .unwrap()
}

#[test]
fn adjust_call() {
    let query = adjust_parser()
        .parse_query("SELECT (ADJUST(?d, ?tz) AS ?a) (STR(?d) AS ?s) {}")
        .unwrap();

    insta::assert_snapshot!(AstPrinter::query(&query).dump(), @r"
    Select
      Projection
        Bind ?a
          Op adjust
            ?d
            ?tz
        Bind ?s
          Op str
            ?d
      Where
    ");
}

#[test]
fn adjust_takes_two_arguments() {
    let diagnostic = syntax_error(adjust_parser().parse_query("ASK { FILTER(ADJUST(?d)) }"));

    insta::assert_snapshot!(diagnostic.text(), @"unexpected `)`, expected `,`");
}

#[test]
fn standard_dialect_rejects_adjust() {
    let diagnostic = query_error("SELECT (ADJUST(?d, ?tz) AS ?a) {}");

    assert_eq!(diagnostic.kind(), DiagnosticKind::UnexpectedToken);
    assert!(diagnostic.text().starts_with("unexpected `ADJUST`"));
}

#[test]
fn expression_entry_is_not_extended() {
    let diagnostic = syntax_error(adjust_parser().parse_expression("ADJUST(?d, ?tz)"));

    assert_eq!(diagnostic.kind(), DiagnosticKind::UnexpectedToken);
}
