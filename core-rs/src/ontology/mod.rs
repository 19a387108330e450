/**
 * ontology module
 *
 * - store: knowledge-store client trait and the Oxigraph implementation
 * - engine: single-worker handle serializing every store round trip
 * - names: qualified-name decomposition and individual name minting
 * - query: SPARQL builders with name and literal validation
 * - binder: query execution, variable extraction, filtering, dedup
 * - persistence: dump/load under the ontology root
 */

pub mod binder;
pub mod engine;
pub mod names;
pub mod persistence;
pub mod query;
pub mod store;

pub use binder::{Bindings, QueryStatus, ResultBinder, FILE_URI_MARKER};
pub use engine::StoreHandle;
pub use names::{mint_local_name, QualifiedName};
pub use persistence::PersistenceController;
pub use query::{QueryBuilder, QueryForm, SparqlQuery, DEFAULT_NAMESPACE};
pub use store::{CallCounts, CountingStore, KnowledgeStore, OxigraphStore, Solution, StoreError};
