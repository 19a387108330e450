// Query Safety Contract Tests
//
// Caller input is interpolated into SPARQL text. The builder must refuse
// anything that could close a term or clause early, and must qualify every
// name with the configured namespace.

use ontobridge_core::errors::BridgeError;
use ontobridge_core::ontology::{QueryBuilder, DEFAULT_NAMESPACE};

const HOSTILE_NAMES: &[&str] = &[
    "Oven> . ?s ?p ?o . <x",
    "Oven' ; DROP ALL",
    "Oven\" }",
    "Oven} INSERT DATA { <a> <b> <c>",
    "Oven\nDELETE WHERE { ?s ?p ?o }",
    "Oven#extra",
    "http://evil.org/onto#Oven",
    "../Oven",
    " Oven",
    "",
];

const HOSTILE_LITERALS: &[&str] = &[
    "/tests/a.xml\" . <x> <y> <z> . \"",
    "/tests/a.xml'",
    "/tests/a\\u0022.xml",
    "/tests/a.xml\n",
    "/tests/a.xml\r",
    "",
];

fn assert_malformed<T: std::fmt::Debug>(result: Result<T, BridgeError>, input: &str) {
    match result {
        Err(BridgeError::MalformedInput(_)) => {}
        other => panic!("input {:?} was not rejected: {:?}", input, other),
    }
}

/// WHY: Names become IRIs inside `<...>`
/// FORBIDDEN: characters that end the IRI or the clause
/// BREAKS: Store integrity if a request can append triples or deletes
#[test]
fn hostile_names_are_rejected_by_every_builder() {
    let builder = QueryBuilder::default();

    for name in HOSTILE_NAMES {
        assert_malformed(builder.create_individual(name, "Person_1"), name);
        assert_malformed(builder.create_individual("Person", name), name);
        assert_malformed(builder.retract_individual(name), name);
        assert_malformed(builder.subclasses_of(name, true), name);
        assert_malformed(builder.superclasses_of(name, false), name);
        assert_malformed(builder.cognitive_test_preconditions(name, "Sub"), name);
        assert_malformed(builder.cognitive_tests_of_type("ArithmeticCts", name), name);
        assert_malformed(builder.performance_preconditions(name, "T_1"), name);
        assert_malformed(builder.record_performance("E_1", "Person_1", name, 1, 1), name);
        assert_malformed(builder.user_performance(name, "ArithmeticCts"), name);
        assert_malformed(builder.clear_performance("Person_1", Some(name)), name);
        assert_malformed(builder.instance_preconditions(name, "Person_1"), name);
        assert_malformed(builder.create_instance("Oven_1", "Oven", name), name);
        assert_malformed(builder.user_instances("Person_1", Some(name)), name);
        assert_malformed(
            builder.create_cognitive_test("T_1", "ArithmeticCts", 1, "/a.xml", "Sub", &[name.to_string()]),
            name,
        );
    }
}

/// WHY: File paths become quoted string literals
/// FORBIDDEN: quotes, backslashes, line breaks
/// BREAKS: Store integrity if a path can close its literal
#[test]
fn hostile_literals_are_rejected() {
    let builder = QueryBuilder::default();

    for literal in HOSTILE_LITERALS {
        assert_malformed(
            builder.create_cognitive_test("T_1", "ArithmeticCts", 1, literal, "Sub", &[]),
            literal,
        );
    }
}

/// WHY: Bare names refer to the bridge's own vocabulary
/// REASON: Every term in a built query is qualified with the namespace
#[test]
fn names_are_namespaced() {
    let builder = QueryBuilder::default();
    let query = builder.subclasses_of("Oven", false).unwrap();

    assert!(query.as_str().contains(&format!("<{}Oven>", DEFAULT_NAMESPACE)));
    assert!(!query.as_str().contains(" Oven "));
}

/// WHY: Builders are pure
/// REASON: Equal inputs give byte-identical queries
#[test]
fn builders_are_deterministic() {
    let builder = QueryBuilder::new("http://example.org/onto#");

    let first = builder.clear_performance("Person_1", Some("ArithmeticCts")).unwrap();
    let second = builder.clear_performance("Person_1", Some("ArithmeticCts")).unwrap();
    assert_eq!(first, second);
    assert!(first.as_str().contains("<http://example.org/onto#Person_1>"));
}

/// WHY: Numbers are typed, never quoted caller text
#[test]
fn numbers_are_typed_integers() {
    let builder = QueryBuilder::default();
    let query = builder
        .record_performance("E_1", "Person_1", "T_1", 1_700_000_000, 100)
        .unwrap();

    assert!(query.as_str().contains("\"1700000000\"^^xsd:integer"));
    assert!(query.as_str().contains("\"100\"^^xsd:integer"));
}
