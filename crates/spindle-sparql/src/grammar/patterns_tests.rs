use crate::DiagnosticKind;
use crate::test_utils::{dump_query, query_error};

#[test]
fn empty_group() {
    insta::assert_snapshot!(dump_query("ASK {}"), @r"
    Ask
      Where
    ");
}

#[test]
fn optional_minus_and_union() {
    let text = indoc::indoc! {"
        ASK {
          ?s ?p ?o
          OPTIONAL { ?s <q> ?x }
          MINUS { ?s <r> ?y }
          { ?a ?b ?c } UNION { ?d ?e ?f }
        }
    "};

    insta::assert_snapshot!(dump_query(text), @r"
    Ask
      Where
        Bgp
          ?s ?p ?o
        Optional
          Bgp
            ?s <q> ?x
        Minus
          Bgp
            ?s <r> ?y
        Union
          Group
            Bgp
              ?a ?b ?c
          Group
            Bgp
              ?d ?e ?f
    ");
}

#[test]
fn single_group_is_not_a_union() {
    insta::assert_snapshot!(dump_query("ASK { { ?s ?p ?o } }"), @r"
    Ask
      Where
        Group
          Bgp
            ?s ?p ?o
    ");
}

#[test]
fn dot_after_nested_pattern() {
    insta::assert_snapshot!(dump_query("ASK { OPTIONAL { ?a ?b ?c } . ?x ?y ?z . }"), @r"
    Ask
      Where
        Optional
          Bgp
            ?a ?b ?c
        Bgp
          ?x ?y ?z
    ");
}

#[test]
fn graph_and_service() {
    insta::assert_snapshot!(
        dump_query("ASK { GRAPH ?g { ?s ?p ?o } SERVICE SILENT <http://ex.org/sparql> { } }"),
        @r"
    Ask
      Where
        Graph ?g
          Bgp
            ?s ?p ?o
        Service SILENT <http://ex.org/sparql>
    "
    );
}

#[test]
fn filter_not_exists() {
    insta::assert_snapshot!(dump_query("ASK { ?s ?p ?o FILTER NOT EXISTS { ?s <q> ?x } }"), @r"
    Ask
      Where
        Bgp
          ?s ?p ?o
        Filter
          Op notexists
            Group
              Bgp
                ?s <q> ?x
    ");
}

#[test]
fn filter_function_call() {
    insta::assert_snapshot!(dump_query("ASK { FILTER <http://ex.org/f>(?x) }"), @r"
    Ask
      Where
        Filter
          Call <http://ex.org/f>
            ?x
    ");
}

#[test]
fn bind() {
    insta::assert_snapshot!(dump_query("ASK { ?s ?p ?o BIND(?o + 1 AS ?n) }"), @r#"
    Ask
      Where
        Bgp
          ?s ?p ?o
        Bind ?n
          Op +
            ?o
            "1"^^xsd:integer
    "#);
}

#[test]
fn bind_to_variable_in_scope() {
    let diagnostic = query_error("ASK { ?s ?p ?o BIND(1 AS ?o) }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::VariableAlreadyBound);
    insta::assert_snapshot!(diagnostic.to_string(), @"error at 15..28: `?o` is already in scope (hint: BIND must introduce a fresh variable)");
}

#[test]
fn bind_checks_only_its_own_group() {
    insta::assert_snapshot!(dump_query("ASK { ?s ?p ?o { BIND(1 AS ?o) } }"), @r#"
    Ask
      Where
        Bgp
          ?s ?p ?o
        Group
          Bind ?o
            "1"^^xsd:integer
    "#);
}

#[test]
fn bind_sees_optional_variables() {
    let diagnostic = query_error("ASK { OPTIONAL { ?s ?p ?x } BIND(2 AS ?x) }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::VariableAlreadyBound);
}

#[test]
fn bind_ignores_minus_variables() {
    insta::assert_snapshot!(dump_query("ASK { MINUS { ?s ?p ?x } BIND(2 AS ?x) }"), @r#"
    Ask
      Where
        Minus
          Bgp
            ?s ?p ?x
        Bind ?x
          "2"^^xsd:integer
    "#);
}

#[test]
fn inline_values() {
    insta::assert_snapshot!(dump_query(r#"ASK { VALUES (?a ?b) { (1 UNDEF) (<x> "y") } }"#), @r#"
    Ask
      Where
        Values ?a ?b
          ("1"^^xsd:integer UNDEF)
          (<x> "y")
    "#);
    insta::assert_snapshot!(dump_query("ASK { VALUES ?a { 1 UNDEF } }"), @r#"
    Ask
      Where
        Values ?a
          ("1"^^xsd:integer)
          (UNDEF)
    "#);
}

#[test]
fn values_row_arity() {
    let diagnostic = query_error("ASK { VALUES (?a ?b) { (1) } }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::ValuesArityMismatch);
    insta::assert_snapshot!(diagnostic.text(), @"VALUES row has 1 value, expected 2 variables");
}

#[test]
fn values_take_no_variables() {
    let diagnostic = query_error("ASK { VALUES ?a { ?b } }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::UnexpectedToken);
}

#[test]
fn sub_select() {
    insta::assert_snapshot!(dump_query("ASK { { SELECT ?s WHERE { ?s ?p ?o } LIMIT 1 } }"), @r"
    Ask
      Where
        Group
          Select
            Projection
              ?s
            Where
              Bgp
                ?s ?p ?o
            Limit 1
    ");
}

#[test]
fn sub_select_projection_is_in_scope() {
    let diagnostic = query_error("ASK { { SELECT ?s WHERE { ?s ?p ?o } } BIND(1 AS ?s) }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::VariableAlreadyBound);
}

#[test]
fn aggregate_in_filter() {
    let diagnostic = query_error("SELECT * WHERE { ?s ?p ?o FILTER(COUNT(?o) > 1) }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::AggregateNotAllowed);
    insta::assert_snapshot!(diagnostic.to_string(), @"error at 33..38: aggregate is not allowed here (hint: aggregates may appear in SELECT expressions, HAVING and ORDER BY)");
}
