/**
 * store.rs
 * Knowledge-store client: the narrow interface the bridge consumes,
 * backed by an in-memory Oxigraph store
 */

use oxigraph::io::RdfFormat;
use oxigraph::model::{GraphNameRef, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Seed ontology declaring the classes the operation handlers rely on
pub const SEED_ONTOLOGY: &str = include_str!("seed.ttl");

/// One solution row: variable name → bound value
pub type Solution = HashMap<String, String>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Update failed: {0}")]
    UpdateError(String),

    #[error("Failed to load ontology: {0}")]
    LoadError(String),

    #[error("Failed to dump ontology: {0}")]
    DumpError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Oxigraph error: {0}")]
    StoreError(String),

    #[error("Query timed out after {0} ms")]
    Timeout(u64),

    #[error("Knowledge store worker is not running")]
    WorkerStopped,
}

/// The knowledge-store client consumed by the bridge.
///
/// Implementations are stateful and not safe for concurrent use; the bridge
/// only ever reaches one through a `StoreHandle`.
pub trait KnowledgeStore: Send {
    /// Run a SELECT or ASK query. An ASK answering true is a single empty row.
    fn query(&mut self, query: &str) -> Result<Vec<Solution>, StoreError>;

    /// Run a SPARQL Update.
    fn update(&mut self, update: &str) -> Result<(), StoreError>;

    /// Serialize the whole store to `path`.
    fn dump(&mut self, path: &Path) -> Result<(), StoreError>;

    /// Merge the contents of `path` into the store.
    fn load(&mut self, path: &Path) -> Result<(), StoreError>;
}

pub struct OxigraphStore {
    store: Store,
}

impl OxigraphStore {
    /// Create an empty in-memory store
    pub fn new() -> Result<Self, StoreError> {
        let store = Store::new().map_err(|e| StoreError::StoreError(e.to_string()))?;
        Ok(Self { store })
    }

    /// Create a store preloaded with the bundled seed ontology
    pub fn with_seed() -> Result<Self, StoreError> {
        let store = Self::new()?;
        store.load_turtle(SEED_ONTOLOGY.as_bytes())?;
        Ok(store)
    }

    /// Load Turtle content into the default graph
    pub fn load_turtle(&self, content: &[u8]) -> Result<(), StoreError> {
        self.store
            .load_from_reader(RdfFormat::Turtle, content)
            .map_err(|e| StoreError::LoadError(e.to_string()))
    }

    /// Number of quads currently held
    pub fn len(&self) -> Result<usize, StoreError> {
        self.store.len().map_err(|e| StoreError::StoreError(e.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.len().map(|n| n == 0)
    }
}

fn term_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::BlankNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

impl KnowledgeStore for OxigraphStore {
    fn query(&mut self, query: &str) -> Result<Vec<Solution>, StoreError> {
        let results = self
            .store
            .query(query)
            .map_err(|e| StoreError::QueryError(e.to_string()))?;

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();

                for solution in solutions {
                    let solution = solution.map_err(|e| StoreError::QueryError(e.to_string()))?;

                    let mut row = Solution::new();
                    for (var, term) in solution.iter() {
                        row.insert(var.as_str().to_string(), term_value(term));
                    }

                    rows.push(row);
                }

                Ok(rows)
            }
            QueryResults::Boolean(true) => Ok(vec![Solution::new()]),
            QueryResults::Boolean(false) => Ok(Vec::new()),
            QueryResults::Graph(_) => Err(StoreError::QueryError(
                "Graph queries do not produce bindings".to_string(),
            )),
        }
    }

    fn update(&mut self, update: &str) -> Result<(), StoreError> {
        self.store
            .update(update)
            .map_err(|e| StoreError::UpdateError(e.to_string()))
    }

    fn dump(&mut self, path: &Path) -> Result<(), StoreError> {
        let file = File::create(path)?;
        let mut writer = self
            .store
            .dump_graph_to_writer(GraphNameRef::DefaultGraph, RdfFormat::Turtle, BufWriter::new(file))
            .map_err(|e| StoreError::DumpError(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<(), StoreError> {
        let file = File::open(path)?;
        self.store
            .load_from_reader(RdfFormat::Turtle, BufReader::new(file))
            .map_err(|e| StoreError::LoadError(e.to_string()))
    }
}

/// Round-trip counters shared between a `CountingStore` and its observers
#[derive(Debug, Default)]
pub struct CallCounts {
    pub queries: AtomicUsize,
    pub updates: AtomicUsize,
    pub dumps: AtomicUsize,
    pub loads: AtomicUsize,
}

impl CallCounts {
    /// Total round trips of any kind
    pub fn total(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.dumps.load(Ordering::SeqCst)
            + self.loads.load(Ordering::SeqCst)
    }
}

/// Decorator counting every round trip made to the wrapped store
pub struct CountingStore<S> {
    inner: S,
    counts: Arc<CallCounts>,
}

impl<S: KnowledgeStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counts: Arc::new(CallCounts::default()),
        }
    }

    pub fn counts(&self) -> Arc<CallCounts> {
        self.counts.clone()
    }
}

impl<S: KnowledgeStore> KnowledgeStore for CountingStore<S> {
    fn query(&mut self, query: &str) -> Result<Vec<Solution>, StoreError> {
        self.counts.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.query(query)
    }

    fn update(&mut self, update: &str) -> Result<(), StoreError> {
        self.counts.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(update)
    }

    fn dump(&mut self, path: &Path) -> Result<(), StoreError> {
        self.counts.dumps.fetch_add(1, Ordering::SeqCst);
        self.inner.dump(path)
    }

    fn load(&mut self, path: &Path) -> Result<(), StoreError> {
        self.counts.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(path)
    }
}
