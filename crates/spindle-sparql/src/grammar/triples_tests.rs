use crate::DiagnosticKind;
use crate::test_utils::{dump_query, query_error};

#[test]
fn object_and_predicate_lists() {
    insta::assert_snapshot!(dump_query("ASK { <s> <p> 1, 2 ; ; <q> 3 ; }"), @r#"
    Ask
      Where
        Bgp
          <s> <p> "1"^^xsd:integer
          <s> <p> "2"^^xsd:integer
          <s> <q> "3"^^xsd:integer
    "#);
}

#[test]
fn rdf_type_and_variable_predicates() {
    insta::assert_snapshot!(dump_query("ASK { ?s a ?t ; ?p ?o }"), @r"
    Ask
      Where
        Bgp
          ?s <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ?t
          ?s ?p ?o
    ");
}

#[test]
fn path_predicates() {
    insta::assert_snapshot!(dump_query("ASK { ?s <p>/<q> ?o . ?s ^<r> ?x . ?s (<t>) ?y }"), @r"
    Ask
      Where
        Bgp
          ?s Seq(<p>, <q>) ?o
          ?s Inverse(<r>) ?x
          ?s <t> ?y
    ");
}

#[test]
fn first_predicate_nested_triples_go_last() {
    insta::assert_snapshot!(dump_query("ASK { <s> <p> [ <q> 1 ] ; <r> [ <t> 2 ] }"), @r#"
    Ask
      Where
        Bgp
          <s> <p> _:g_0
          <s> <r> _:g_1
          _:g_1 <t> "2"^^xsd:integer
          _:g_0 <q> "1"^^xsd:integer
    "#);
}

#[test]
fn collection_cells_then_item_triples() {
    insta::assert_snapshot!(dump_query("ASK { <s> <p> ( 1 [ <q> 2 ] ) }"), @r#"
    Ask
      Where
        Bgp
          <s> <p> _:g_1
          _:g_1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> "1"^^xsd:integer
          _:g_1 <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> _:g_2
          _:g_2 <http://www.w3.org/1999/02/22-rdf-syntax-ns#first> _:g_0
          _:g_2 <http://www.w3.org/1999/02/22-rdf-syntax-ns#rest> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil>
          _:g_0 <q> "2"^^xsd:integer
    "#);
}

#[test]
fn blank_node_subject() {
    insta::assert_snapshot!(dump_query("ASK { [ <p> 1 ] <q> 2 . [ <r> 3 ] }"), @r#"
    Ask
      Where
        Bgp
          _:g_0 <q> "2"^^xsd:integer
          _:g_0 <p> "1"^^xsd:integer
          _:g_1 <r> "3"^^xsd:integer
    "#);
}

#[test]
fn anonymous_nodes_are_always_fresh() {
    insta::assert_snapshot!(dump_query("ASK { [] <p> [] . [] <p> () }"), @r"
    Ask
      Where
        Bgp
          _:g_0 <p> _:g_1
          _:g_2 <p> <http://www.w3.org/1999/02/22-rdf-syntax-ns#nil>
    ");
}

#[test]
fn label_reused_in_same_group() {
    insta::assert_snapshot!(dump_query("ASK { _:b <p> 1 . FILTER(true) _:b <q> 2 }"), @r#"
    Ask
      Where
        Bgp
          _:e_b <p> "1"^^xsd:integer
        Filter
          "true"^^xsd:boolean
        Bgp
          _:e_b <q> "2"^^xsd:integer
    "#);
}

#[test]
fn label_reused_in_nested_group() {
    let diagnostic = query_error("ASK { _:b <p> 1 . { _:b <q> 2 } }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::DuplicateBlankNodeLabel);
    insta::assert_snapshot!(diagnostic.to_string(), @"error at 20..23: blank node label `b` is already used in another graph pattern (related: first used here at 6..9)");
}

#[test]
fn templates_take_no_paths() {
    let diagnostic = query_error("CONSTRUCT { ?s <p>/<q> ?o } WHERE { ?s ?p ?o }");

    assert_eq!(diagnostic.kind(), DiagnosticKind::UnexpectedToken);
    assert!(diagnostic.text().starts_with("unexpected `/`"));
}
