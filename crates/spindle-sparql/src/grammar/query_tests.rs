use crate::test_utils::{dump_query, parser, query_error};
use crate::{AstPrinter, DiagnosticKind};

#[test]
fn prologue() {
    let query = parser()
        .parse_query("BASE <http://ex.org/> PREFIX ex: <ns#> SELECT * { ex:s ?p ?o }")
        .unwrap();

    insta::assert_snapshot!(AstPrinter::query(&query).dump(), @r"
    Select
      Base <http://ex.org/>
      Prefix ex: <http://ex.org/ns#>
      Projection *
      Where
        Bgp
          <http://ex.org/ns#s> ?p ?o
    ");
}

#[test]
fn later_base_resolves_against_earlier() {
    let query = parser()
        .parse_query("BASE <http://ex.org/a/> BASE <b/> ASK { <c> ?p ?o }")
        .unwrap();

    assert_eq!(query.base.as_deref(), Some("http://ex.org/a/b/"));
}

#[test]
fn select_projection() {
    insta::assert_snapshot!(
        dump_query("SELECT DISTINCT ?s (STR(?o) AS ?label) WHERE { ?s ?p ?o }"),
        @r"
    Select DISTINCT
      Projection
        ?s
        Bind ?label
          Op str
            ?o
      Where
        Bgp
          ?s ?p ?o
    "
    );
    insta::assert_snapshot!(dump_query("SELECT REDUCED ?x ?x {}"), @r"
    Select REDUCED
      Projection
        ?x
        ?x
      Where
    ");
}

#[test]
fn construct() {
    insta::assert_snapshot!(
        dump_query("CONSTRUCT { ?s <p> [ <q> ?o ] } FROM <g> WHERE { ?s <r> ?o }"),
        @r"
    Construct
      Template
        ?s <p> _:g_0
        _:g_0 <q> ?o
      From <g>
      Where
        Bgp
          ?s <r> ?o
    "
    );
}

#[test]
fn construct_where() {
    insta::assert_snapshot!(dump_query("CONSTRUCT WHERE { ?s <p> ?o . }"), @r"
    Construct
      Template
        ?s <p> ?o
      Where
        Bgp
          ?s <p> ?o
    ");
}

#[test]
fn construct_template_and_where_are_separate_label_scopes() {
    let diagnostic = query_error("CONSTRUCT { _:b <p> ?o } WHERE { _:b <q> ?o }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::DuplicateBlankNodeLabel);
    insta::assert_snapshot!(diagnostic.to_string(), @"error at 33..36: blank node label `b` is already used in another graph pattern (related: first used here at 12..15)");
}

#[test]
fn describe() {
    insta::assert_snapshot!(dump_query("DESCRIBE <x> ?y FROM <g> FROM NAMED <h>"), @r"
    Describe
      Targets
        <x>
        ?y
      From <g>
      FromNamed <h>
    ");
    insta::assert_snapshot!(dump_query("DESCRIBE * WHERE { ?s ?p ?o }"), @r"
    Describe
      Targets *
      Where
        Bgp
          ?s ?p ?o
    ");
}

#[test]
fn ask_without_where_keyword() {
    insta::assert_snapshot!(dump_query("ASK { ?s ?p ?o }"), @r"
    Ask
      Where
        Bgp
          ?s ?p ?o
    ");
}

#[test]
fn solution_modifiers() {
    let text = indoc::indoc! {"
        SELECT ?g (COUNT(?s) AS ?n)
        WHERE { ?s <p> ?g }
        GROUP BY ?g
        HAVING (COUNT(?s) > 1)
        ORDER BY DESC(?n) ?g
        LIMIT 10 OFFSET 5
    "};

    insta::assert_snapshot!(dump_query(text), @r#"
    Select
      Projection
        ?g
        Bind ?n
          Aggregate count
            ?s
      Where
        Bgp
          ?s <p> ?g
      GroupBy
        ?g
      Having
        Op >
          Aggregate count
            ?s
          "1"^^xsd:integer
      OrderBy
        Desc
          ?n
        Asc
          ?g
      Limit 10
      Offset 5
    "#);
}

#[test]
fn group_by_with_alias() {
    insta::assert_snapshot!(
        dump_query("SELECT ?k (SAMPLE(?o) AS ?v) { ?s ?p ?o } GROUP BY (STR(?s) AS ?k)"),
        @r"
    Select
      Projection
        ?k
        Bind ?v
          Aggregate sample
            ?o
      Where
        Bgp
          ?s ?p ?o
      GroupBy
        As ?k
          Op str
            ?s
    "
    );
}

#[test]
fn offset_before_limit() {
    insta::assert_snapshot!(dump_query("SELECT * {} OFFSET 5 LIMIT 10"), @r"
    Select
      Projection *
      Where
      Limit 10
      Offset 5
    ");
}

#[test]
fn trailing_values() {
    insta::assert_snapshot!(dump_query("SELECT ?a {} VALUES ?a { <x> }"), @r"
    Select
      Projection
        ?a
      Where
      Values ?a
        (<x>)
    ");
}

#[test]
fn ungrouped_variable() {
    let diagnostic = query_error("SELECT ?s (COUNT(?o) AS ?n) WHERE { ?s ?p ?o }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::UngroupedVariable);
    insta::assert_snapshot!(diagnostic.to_string(), @"error at 7..9: `?s` is neither grouped nor aggregated (hint: add it to GROUP BY or wrap it in an aggregate such as `SAMPLE`)");
}

#[test]
fn ungrouped_variable_inside_expression() {
    let diagnostic = query_error("SELECT (?o + COUNT(?s) AS ?n) { ?s ?p ?o } GROUP BY ?s");

    assert_eq!(diagnostic.kind(), DiagnosticKind::UngroupedVariable);
    assert_eq!(diagnostic.text(), "`?o` is neither grouped nor aggregated");
}

#[test]
fn earlier_alias_counts_as_grouped() {
    let query = parser().parse_query("SELECT (COUNT(?o) AS ?n) (?n + 1 AS ?m) { ?s ?p ?o }");

    assert!(query.is_ok());
}

#[test]
fn wildcard_with_group_by() {
    let diagnostic = query_error("SELECT * WHERE { ?s ?p ?o } GROUP BY ?s");

    insta::assert_snapshot!(diagnostic.to_string(), @"error at 7..8: `SELECT *` cannot be combined with GROUP BY (hint: list the grouped variables explicitly)");
}

#[test]
fn duplicate_projection() {
    let diagnostic = query_error("SELECT ?x (1 AS ?x) {}");

    assert_eq!(diagnostic.kind(), DiagnosticKind::DuplicateProjection);
    insta::assert_snapshot!(diagnostic.to_string(), @"error at 10..19: `?x` is already projected");
}

#[test]
fn aggregate_in_group_by() {
    let diagnostic = query_error("SELECT ?n {} GROUP BY (COUNT(?x) AS ?n)");

    assert_eq!(diagnostic.kind(), DiagnosticKind::AggregateNotAllowed);
}

#[test]
fn limit_out_of_range() {
    let diagnostic = query_error("SELECT * {} LIMIT 99999999999999999999999");

    assert_eq!(diagnostic.kind(), DiagnosticKind::InvalidInteger);
    insta::assert_snapshot!(diagnostic.text(), @"invalid integer: 99999999999999999999999");
}

#[test]
fn limit_must_be_unsigned() {
    let diagnostic = query_error("SELECT * {} LIMIT -1");

    insta::assert_snapshot!(diagnostic.text(), @"unexpected `-1`, expected integer");
}
