//! Error types for the ontology bridge

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Knowledge store error: {0}")]
    Engine(String),

    /// The round trip expired; the job stays queued and may still commit
    #[error("Knowledge store error: query timed out after {0} ms")]
    EngineTimeout(u64),

    #[error("{0}")]
    NoSolutions(String),

    /// `compensated` is false when the retraction of a possibly committed
    /// individual could not be confirmed
    #[error("Ontology individual creation failed: {reason} (individual retracted: {compensated})")]
    OntologyCreateFailed { reason: String, compensated: bool },

    #[error("Alias extraction failed for '{name}' (individual retracted: {compensated})")]
    AliasExtractionFailed { name: String, compensated: bool },

    #[error("Alias persistence failed: {0} (ontology individual retracted)")]
    PersistFailed(String),

    #[error("Alias persistence failed: {persist}; retracting ontology individual '{individual}' also failed: {retract}")]
    CompensationFailed {
        individual: String,
        persist: String,
        retract: String,
    },

    #[error("Path does not exist: {0}")]
    PathNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Malformed qualified name: {0}")]
    Malformed(String),

    #[error("User directory error: {0}")]
    Directory(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<crate::ontology::store::StoreError> for BridgeError {
    fn from(err: crate::ontology::store::StoreError) -> Self {
        match err {
            crate::ontology::store::StoreError::Timeout(ms) => BridgeError::EngineTimeout(ms),
            other => BridgeError::Engine(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
