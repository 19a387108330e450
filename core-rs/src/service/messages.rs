//! Request and response data for each operation
//!
//! Requests deserialize with every field optional so that missing values
//! reach validation instead of failing in the decoder. Numbers are signed so
//! out-of-range input is reported as malformed rather than rejected by type.

use serde::{Deserialize, Serialize};

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CreateAliasRequest {
    pub username: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecordPerformanceRequest {
    pub test: String,
    pub patient_ontology_alias: String,
    pub timestamp: i64,
    pub score: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CreateCognitiveTestRequest {
    pub test_type: String,
    pub test_difficulty: i64,
    pub test_path: String,
    pub test_subtype: String,
    pub supported_languages: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TestsOfTypeRequest {
    pub test_type: String,
    pub test_language: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserPerformanceRequest {
    pub ontology_alias: String,
    pub test_type: String,
}

/// An empty `test_type` clears every record of the user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClearPerformanceRequest {
    pub username: String,
    pub test_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassQueryRequest {
    pub ontology_class: String,
    pub recursive: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SubSuperclassRequest {
    pub parent_class: String,
    pub child_class: String,
    pub recursive: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CreateInstanceRequest {
    pub username: String,
    pub ontology_class: String,
}

/// `ontology_class` of `*` matches any class
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserInstancesRequest {
    pub username: String,
    pub ontology_class: String,
}

/// Path relative to the ontology root
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OntologyFileRequest {
    pub file_url: String,
}

// =============================================================================
// Response data
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AliasData {
    pub ontology_alias: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PerformanceEntryData {
    pub cognitive_test_performance_entry: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CreatedTestData {
    pub test_name: String,
}

/// Parallel columns, one entry per test
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TestsOfTypeData {
    pub tests: Vec<String>,
    pub difficulty: Vec<String>,
    pub file_paths: Vec<String>,
    pub subtype: Vec<String>,
}

/// Parallel columns, one entry per performance record, oldest first
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UserPerformanceData {
    pub tests: Vec<String>,
    pub scores: Vec<String>,
    pub difficulty: Vec<String>,
    pub timestamps: Vec<String>,
    pub subtypes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ClassesData {
    pub results: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct IsSubclassData {
    pub result: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct InstanceData {
    pub instance_name: String,
}
