//! Response envelope shared by every operation
//!
//! ```json
//! {"success": true, "<data fields>": ..., "trace": [], "error": ""}
//! ```
//!
//! A failed response carries default data, a non-empty `error`, and a trace
//! holding the queries attempted followed by the error itself.

use serde::Serialize;

use crate::errors::{BridgeError, Result};
use crate::ontology::SparqlQuery;

/// Diagnostics gathered while one operation runs
#[derive(Debug, Default, Clone)]
pub struct Trace {
    queries: Vec<String>,
    notes: Vec<String>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a query about to be executed
    pub fn query(&mut self, query: &SparqlQuery) {
        self.queries.push(query.to_string());
    }

    /// Record a note reported even on success
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

/// Operations without data fields
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct NoData {}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Response<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
    pub trace: Vec<String>,
    pub error: String,
}

impl<T: Default> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            trace: Vec::new(),
            error: String::new(),
        }
    }

    pub fn failure(error: &BridgeError, trace: Trace) -> Self {
        let message = error.to_string();
        let mut lines = trace.queries;
        lines.extend(trace.notes);
        lines.push(message.clone());

        Self {
            success: false,
            data: T::default(),
            trace: lines,
            error: message,
        }
    }

    /// Convert an operation outcome into its envelope
    pub fn from_result(result: Result<T>, trace: Trace) -> Self {
        match result {
            Ok(data) => Self {
                trace: trace.notes,
                ..Self::ok(data)
            },
            Err(error) => Self::failure(&error, trace),
        }
    }
}
