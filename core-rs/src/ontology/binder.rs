// ResultBinder - runs built queries and shapes their solutions
//
// One call is one round trip through the StoreHandle. Solutions are reduced
// to the requested variables, in request order; rows that leave a requested
// variable unbound are dropped. Filtering and deduplication are opt-in per
// call so handlers pick the policy that fits their operation.

use std::collections::HashSet;
use tracing::debug;

use super::engine::StoreHandle;
use super::names::QualifiedName;
use super::query::SparqlQuery;
use crate::errors::Result;

/// Marks a bound value as a raw file-system URI rather than an ontology term
pub const FILE_URI_MARKER: &str = "file:///";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    NoSolutions,
    HasSolutions,
}

/// Extracted solution rows for one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings {
    status: QueryStatus,
    variables: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Bindings {
    /// Build from raw solutions, keeping only `variables`
    pub fn from_solutions(solutions: Vec<super::store::Solution>, variables: &[&str]) -> Self {
        let status = if solutions.is_empty() {
            QueryStatus::NoSolutions
        } else {
            QueryStatus::HasSolutions
        };

        let rows = solutions
            .into_iter()
            .filter_map(|solution| {
                variables
                    .iter()
                    .map(|var| solution.get(*var).cloned())
                    .collect::<Option<Vec<String>>>()
            })
            .collect();

        Self {
            status,
            variables: variables.iter().map(|v| v.to_string()).collect(),
            rows,
        }
    }

    pub fn status(&self) -> QueryStatus {
        self.status
    }

    pub fn has_solutions(&self) -> bool {
        self.status == QueryStatus::HasSolutions
    }

    /// True when no complete row survived extraction and filtering
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// Values of one requested variable, in row order
    pub fn column(&self, variable: &str) -> Vec<String> {
        match self.variables.iter().position(|v| v == variable) {
            Some(index) => self.rows.iter().map(|row| row[index].clone()).collect(),
            None => Vec::new(),
        }
    }

    /// Drop every row holding a raw file-system URI
    pub fn without_file_uris(mut self) -> Self {
        self.rows
            .retain(|row| !row.iter().any(|value| value.contains(FILE_URI_MARKER)));
        self
    }

    /// Drop rows equal to an earlier row, keeping first-seen order
    pub fn deduplicated(mut self) -> Self {
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(row.clone()));
        self
    }

    /// Local names of one variable's values; malformed names are skipped
    pub fn local_names(&self, variable: &str) -> Vec<String> {
        self.column(variable)
            .into_iter()
            .filter_map(|value| match QualifiedName::split(&value) {
                Ok(name) => Some(name.into_local()),
                Err(e) => {
                    debug!("skipping non-ontology value: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Executes queries against the shared store
#[derive(Clone)]
pub struct ResultBinder {
    store: StoreHandle,
}

impl ResultBinder {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Run a SELECT or ASK and extract `variables` from each solution
    pub fn execute(&self, query: &SparqlQuery, variables: &[&str]) -> Result<Bindings> {
        debug!("query:\n{}", query);
        let solutions = self.store.query(query.as_str())?;
        debug!("{} solution(s)", solutions.len());
        Ok(Bindings::from_solutions(solutions, variables))
    }

    /// Run an ASK query
    pub fn holds(&self, query: &SparqlQuery) -> Result<bool> {
        Ok(self.execute(query, &[])?.has_solutions())
    }

    /// Run a SPARQL Update
    pub fn apply(&self, update: &SparqlQuery) -> Result<()> {
        debug!("update:\n{}", update);
        self.store.update(update.as_str())?;
        Ok(())
    }
}
