//! # Ontobridge Core - Ontology Query Translation & Alias Management
//!
//! A session layer between typed request/response operations (cognitive-test
//! bookkeeping, class hierarchy queries, instance creation, ontology
//! persistence) and a SPARQL knowledge store. Requests are validated, turned
//! into namespaced queries, executed through one serialized store handle, and
//! answered with a uniform `{success, data, trace, error}` envelope.
//!
//! ## Key Features
//!
//! - Query builder that refuses unsafe names and literals instead of escaping them
//! - Result binder with order-preserving dedup and file-URI filtering
//! - Per-user ontology aliases, persisted to a relational directory with
//!   compensation when either side fails
//! - Automatic dump of the whole store after every mutation
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              OntologyService                 │
//! │  validate → alias → build → execute → dump   │
//! └──────────────────────────────────────────────┘
//!      │             │                │
//!      ▼             ▼                ▼
//! ┌──────────┐ ┌─────────────┐ ┌──────────────┐
//! │ Alias    │ │ QueryBuilder│ │ Persistence  │
//! │ Registry │ │ ResultBinder│ │ Controller   │
//! └──────────┘ └─────────────┘ └──────────────┘
//!      │             │                │
//!      ▼             ▼                ▼
//! ┌──────────┐ ┌──────────────────────────────┐
//! │ User     │ │ StoreHandle (single worker)  │
//! │ Directory│ │   └─ KnowledgeStore (Oxigraph)│
//! └──────────┘ └──────────────────────────────┘
//! ```

pub mod alias;
pub mod config;
pub mod directory;
pub mod envelope;
pub mod errors;
pub mod ontology;
pub mod service;

pub use alias::AliasRegistry;
pub use config::{BridgeConfig, DirectoryConfig};
pub use directory::{HttpUserDirectory, LocalUserDirectory, UserDirectory};
pub use envelope::{NoData, Response, Trace};
pub use errors::BridgeError;
pub use ontology::{
    Bindings, CountingStore, KnowledgeStore, OxigraphStore, PersistenceController, QualifiedName, QueryBuilder,
    QueryStatus, ResultBinder, StoreHandle,
};
pub use service::OntologyService;

/// Version of the bridge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
