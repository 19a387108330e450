// Response Envelope Contract Tests
//
// Every operation answers with {success, <data fields>, trace, error}.
// Callers branch on `success` alone, so the other fields must agree with it.

use ontobridge_core::directory::LocalUserDirectory;
use ontobridge_core::ontology::OxigraphStore;
use ontobridge_core::service::*;
use ontobridge_core::{BridgeConfig, OntologyService, Response};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

fn service(temp_dir: &TempDir) -> OntologyService {
    let users = LocalUserDirectory::new();
    users
        .insert("tbl_user", &[("username", "alice"), ("ontology_alias", "None")])
        .unwrap();
    let config = BridgeConfig {
        ontology_root: temp_dir.path().to_path_buf(),
        assets_root: temp_dir.path().to_path_buf(),
        ..BridgeConfig::default()
    };
    OntologyService::new(config, Box::new(OxigraphStore::with_seed().unwrap()), Arc::new(users)).unwrap()
}

fn to_json<T: Serialize>(response: &Response<T>) -> Value {
    serde_json::to_value(response).unwrap()
}

/// Envelope invariants shared by every operation
fn assert_envelope<T: Serialize + Default + PartialEq + std::fmt::Debug>(response: &Response<T>) {
    if response.success {
        assert!(response.error.is_empty(), "success with error '{}'", response.error);
    } else {
        assert!(!response.error.is_empty(), "failure without error message");
        assert_eq!(response.data, T::default(), "failure carried data");
        assert_eq!(
            response.trace.last(),
            Some(&response.error),
            "failure trace must end with the error"
        );
    }

    let json = to_json(response);
    assert!(json.get("success").map(Value::is_boolean).unwrap_or(false));
    assert!(json.get("trace").map(Value::is_array).unwrap_or(false));
    assert!(json.get("error").map(Value::is_string).unwrap_or(false));
    assert!(json.get("data").is_none(), "data fields must be flattened");
}

/// WHY: Callers read `error` only when `success` is false
/// REASON: An empty error on failure hides the cause; an error on success
///         is indistinguishable from a partial failure
/// BREAKS: Every client that branches on `success`
#[test]
fn success_and_error_agree_for_every_operation() {
    let temp_dir = TempDir::new().unwrap();
    let service = service(&temp_dir);

    assert_envelope(&service.create_ontology_alias(&CreateAliasRequest {
        username: "alice".to_string(),
    }));
    assert_envelope(&service.create_ontology_alias(&CreateAliasRequest {
        username: "nobody".to_string(),
    }));
    assert_envelope(&service.record_user_performance(&RecordPerformanceRequest::default()));
    assert_envelope(&service.create_cognitive_test(&CreateCognitiveTestRequest::default()));
    assert_envelope(&service.cognitive_tests_of_type(&TestsOfTypeRequest {
        test_type: "ArithmeticCts".to_string(),
        test_language: "en".to_string(),
    }));
    assert_envelope(&service.user_performance_cognitive_tests(&UserPerformanceRequest {
        ontology_alias: "Person_nobody".to_string(),
        test_type: "ArithmeticCts".to_string(),
    }));
    assert_envelope(&service.clear_user_performance(&ClearPerformanceRequest {
        username: "alice".to_string(),
        test_type: String::new(),
    }));
    assert_envelope(&service.subclasses_of(&ClassQueryRequest {
        ontology_class: "Device".to_string(),
        recursive: true,
    }));
    assert_envelope(&service.superclasses_of(&ClassQueryRequest {
        ontology_class: "Unicorn".to_string(),
        recursive: false,
    }));
    assert_envelope(&service.is_subsuperclass_of(&SubSuperclassRequest {
        parent_class: "Device".to_string(),
        child_class: "Oven".to_string(),
        recursive: true,
    }));
    assert_envelope(&service.create_instance(&CreateInstanceRequest {
        username: "alice".to_string(),
        ontology_class: "Oven".to_string(),
    }));
    assert_envelope(&service.user_instances_of_class(&UserInstancesRequest {
        username: "alice".to_string(),
        ontology_class: "Table".to_string(),
    }));
    assert_envelope(&service.dump_ontology(&OntologyFileRequest {
        file_url: "out.ttl".to_string(),
    }));
    assert_envelope(&service.load_ontology(&OntologyFileRequest {
        file_url: "absent.ttl".to_string(),
    }));
}

/// WHY: Wire field names are shared with existing clients
/// REASON: Data fields sit beside success/trace/error, not under a wrapper
/// BREAKS: Clients reading `ontology_alias`, `results`, `instance_name`
#[test]
fn data_fields_use_wire_names() {
    let temp_dir = TempDir::new().unwrap();
    let service = service(&temp_dir);

    let alias = to_json(&service.create_ontology_alias(&CreateAliasRequest {
        username: "alice".to_string(),
    }));
    assert!(alias["ontology_alias"].as_str().unwrap().starts_with("Person_"));

    let classes = to_json(&service.subclasses_of(&ClassQueryRequest {
        ontology_class: "HouseholdAppliance".to_string(),
        recursive: false,
    }));
    assert_eq!(classes["results"].as_array().unwrap().len(), 2);

    let check = to_json(&service.is_subsuperclass_of(&SubSuperclassRequest {
        parent_class: "Device".to_string(),
        child_class: "Oven".to_string(),
        recursive: true,
    }));
    assert_eq!(check["result"], true);

    let instance = to_json(&service.create_instance(&CreateInstanceRequest {
        username: "alice".to_string(),
        ontology_class: "Oven".to_string(),
    }));
    assert!(instance["instance_name"].as_str().unwrap().starts_with("Oven_"));
}

/// WHY: Failures must be diagnosable from the envelope alone
/// REASON: The trace carries the queries attempted before the error
/// BREAKS: Operator debugging of store-side failures
#[test]
fn failed_query_is_traced() {
    let temp_dir = TempDir::new().unwrap();
    let service = service(&temp_dir);

    let response = service.superclasses_of(&ClassQueryRequest {
        ontology_class: "Unicorn".to_string(),
        recursive: true,
    });

    assert!(!response.success);
    assert_eq!(response.trace.len(), 2);
    assert!(response.trace[0].contains("Unicorn"));
    assert!(response.trace[0].contains("SELECT"));
}

/// WHY: NoSolutions is a normal outcome for listing operations
/// REASON: An existing class without subclasses is a successful empty list
/// BREAKS: Clients treating leaf classes as missing classes
#[test]
fn empty_listing_is_success() {
    let temp_dir = TempDir::new().unwrap();
    let service = service(&temp_dir);

    let response = service.subclasses_of(&ClassQueryRequest {
        ontology_class: "Food".to_string(),
        recursive: false,
    });

    assert!(response.success);
    assert_eq!(to_json(&response)["results"], serde_json::json!([]));
}
