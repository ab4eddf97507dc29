use spindle_core::{CompositionError, ParserConfig, Registry};

use super::{
    SparqlRule, adjust, adjust_rules, expression_only, link, path_only, path_rules, sparql_1_1,
};
use crate::Sparql;

fn entries(registry: &Registry<Sparql>) -> Vec<&'static str> {
    registry.entry_names().collect()
}

#[test]
fn compositions_link() {
    for registry in [sparql_1_1(), expression_only(), path_only(), adjust()] {
        assert!(link(registry.unwrap(), ParserConfig::default()).is_ok());
    }
}

#[test]
fn entry_rules() {
    assert_eq!(entries(&sparql_1_1().unwrap()), ["QueryUnit", "UpdateUnit"]);
    assert_eq!(entries(&expression_only().unwrap()), ["Expression"]);
    assert_eq!(entries(&path_only().unwrap()), ["Path"]);
    assert_eq!(entries(&adjust().unwrap()), ["QueryUnit", "UpdateUnit"]);
}

#[test]
fn expression_only_has_no_graph_patterns() {
    let registry = expression_only().unwrap();

    assert!(registry.contains("BuiltInCall"));
    assert!(registry.contains("Aggregate"));
    assert!(!registry.contains("ExistsFunc"));
    assert!(!registry.contains("NotExistsFunc"));
    assert!(!registry.contains("GroupGraphPattern"));
}

#[test]
fn adjust_adds_one_rule() {
    let full = sparql_1_1().unwrap();
    let dialect = adjust().unwrap();

    assert!(!full.contains("BuiltInAdjust"));
    assert!(dialect.contains("BuiltInAdjust"));
    assert_eq!(dialect.len(), full.len() + 1);
}

#[test]
fn merge_without_override_is_ambiguous() {
    let fragment = Registry::create(adjust_rules()).unwrap();

    let err = sparql_1_1()
        .unwrap()
        .merge(fragment, Vec::<SparqlRule>::new())
        .unwrap_err();

    assert_eq!(err, CompositionError::AmbiguousMerge("BuiltInCall".into()));
}

#[test]
fn fragment_alone_does_not_link() {
    let registry = Registry::create(path_rules())
        .unwrap()
        .entries(&["Path"])
        .unwrap();

    let Err(err) = link(registry, ParserConfig::default()) else {
        panic!("path rules without `iri` linked");
    };

    assert!(matches!(err, CompositionError::UnresolvedRule { .. }));
}
