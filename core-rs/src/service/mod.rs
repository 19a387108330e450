//! Operation handlers
//!
//! Every handler runs validate → resolve alias → build → execute → bind →
//! dump (after mutations) and always answers with a `Response` envelope.
//! Validation happens before any store round trip.
//!
//! - cognitive: aliases, cognitive tests and performance records
//! - classes: class hierarchy and user-owned instances
//! - files: explicit ontology dump/load

mod classes;
mod cognitive;
mod files;
pub mod messages;

pub use classes::ANY_CLASS;
pub use messages::*;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::alias::AliasRegistry;
use crate::config::BridgeConfig;
use crate::directory::UserDirectory;
use crate::envelope::Trace;
use crate::errors::{BridgeError, Result};
use crate::ontology::{
    Bindings, KnowledgeStore, PersistenceController, QueryBuilder, ResultBinder, SparqlQuery, StoreHandle,
};

pub struct OntologyService {
    config: BridgeConfig,
    builder: QueryBuilder,
    binder: ResultBinder,
    persistence: Arc<PersistenceController>,
    aliases: AliasRegistry,
}

impl OntologyService {
    /// Wire the handlers around `store` and `directory`
    pub fn new(config: BridgeConfig, store: Box<dyn KnowledgeStore>, directory: Arc<dyn UserDirectory>) -> Result<Self> {
        config.validate()?;

        let handle = StoreHandle::spawn(store, config.query_timeout())?;
        let builder = QueryBuilder::new(config.namespace.clone());
        let binder = ResultBinder::new(handle.clone());
        let persistence = Arc::new(PersistenceController::new(
            config.ontology_root.clone(),
            config.default_dump.clone(),
            handle,
        ));
        let aliases = AliasRegistry::new(
            directory,
            config.user_table.clone(),
            binder.clone(),
            builder.clone(),
            persistence.clone(),
        );

        Ok(Self {
            config,
            builder,
            binder,
            persistence,
            aliases,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    pub fn binder(&self) -> &ResultBinder {
        &self.binder
    }

    pub fn aliases(&self) -> &AliasRegistry {
        &self.aliases
    }

    pub fn persistence(&self) -> &PersistenceController {
        &self.persistence
    }

    /// Load the default dump if one exists; returns whether it did
    pub fn restore(&self) -> Result<bool> {
        self.persistence.load_default_if_present()
    }

    fn execute(&self, query: &SparqlQuery, variables: &[&str], trace: &mut Trace) -> Result<Bindings> {
        trace.query(query);
        self.binder.execute(query, variables)
    }

    fn holds(&self, query: &SparqlQuery, trace: &mut Trace) -> Result<bool> {
        trace.query(query);
        self.binder.holds(query)
    }

    /// Run an update. A timed-out update stays queued and may still commit,
    /// so a dump is queued behind it to keep a late commit durable.
    fn apply(&self, update: &SparqlQuery, trace: &mut Trace) -> Result<()> {
        trace.query(update);
        let result = self.binder.apply(update);
        if let Err(BridgeError::EngineTimeout(ms)) = &result {
            warn!("update timed out after {} ms and may still be applied", ms);
            trace.note("Update timed out and may still be applied by the knowledge store");
            self.after_mutation(trace);
        }
        result
    }

    /// Make a completed mutation durable. A failed dump leaves the mutation
    /// in place and is reported as a trace note.
    fn after_mutation(&self, trace: &mut Trace) {
        match self.persistence.dump_default() {
            Ok(path) => debug!("mutation persisted to {}", path.display()),
            Err(e) => {
                warn!("ontology dump after mutation failed: {}", e);
                trace.note(format!("Ontology dump failed: {}", e));
            }
        }
    }
}

/// Reject an empty field with `message`
fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BridgeError::MalformedInput(message.to_string()));
    }
    Ok(())
}
