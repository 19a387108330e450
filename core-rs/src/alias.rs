//! Ontology alias registry
//!
//! Each user handle maps to at most one `Person` individual in the knowledge
//! store. The mapping lives in the user directory; the individual lives in
//! the store. Creation runs create → decompose → persist, and any failure
//! from the create step on retracts the individual (a timed-out insert may
//! still commit later), so the two sides either both know the alias or
//! neither does. A retraction that cannot be confirmed is reported through
//! `CompensationFailed` or the `compensated` flag of the error.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::directory::UserDirectory;
use crate::errors::{BridgeError, Result};
use crate::ontology::query::PERSON;
use crate::ontology::{mint_local_name, PersistenceController, QualifiedName, QueryBuilder, ResultBinder};

/// Directory column holding the user handle
pub const USER_COLUMN: &str = "username";
/// Directory column holding the alias
pub const ALIAS_COLUMN: &str = "ontology_alias";
/// Directory value meaning "no alias yet"
pub const NO_ALIAS: &str = "None";

pub struct AliasRegistry {
    directory: Arc<dyn UserDirectory>,
    table: String,
    binder: ResultBinder,
    builder: QueryBuilder,
    persistence: Arc<PersistenceController>,
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AliasRegistry {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        table: impl Into<String>,
        binder: ResultBinder,
        builder: QueryBuilder,
        persistence: Arc<PersistenceController>,
    ) -> Self {
        Self {
            directory,
            table: table.into(),
            binder,
            builder,
            persistence,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Existing alias of `username`, `None` when the user has none yet
    pub fn lookup(&self, username: &str) -> Result<Option<String>> {
        let rows = self
            .directory
            .fetch(&self.table, &[(USER_COLUMN, username)], &[ALIAS_COLUMN])?;

        let row = rows.first().ok_or_else(|| {
            BridgeError::UserNotFound(format!("User not found, incorrect username? ({})", username))
        })?;
        let alias = row.first().ok_or_else(|| {
            BridgeError::Directory(format!("directory row for '{}' has no {}", username, ALIAS_COLUMN))
        })?;

        if alias.is_empty() || alias == NO_ALIAS {
            Ok(None)
        } else {
            Ok(Some(alias.clone()))
        }
    }

    /// Alias of `username`, creating and persisting one on first use
    pub fn get_or_create(&self, username: &str) -> Result<String> {
        if username.is_empty() {
            return Err(BridgeError::MalformedInput("Error, empty username".to_string()));
        }

        let lock = self.user_lock(username);
        let result = {
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            match self.lookup(username) {
                Ok(Some(alias)) => {
                    debug!("user '{}' has alias {}", username, alias);
                    Ok(alias)
                }
                Ok(None) => self.create(username),
                Err(e) => Err(e),
            }
        };
        self.release_user_lock(username, lock);

        result
    }

    fn user_lock(&self, username: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .user_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(username.to_string()).or_default().clone()
    }

    /// Drop the map entry once no other caller holds or waits on it.
    /// Clones are only handed out under the map lock, so the count is exact.
    fn release_user_lock(&self, username: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self
            .user_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map, one here.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(username);
        }
    }

    fn create(&self, username: &str) -> Result<String> {
        let local = mint_local_name(PERSON);

        let insert = self
            .builder
            .create_individual(PERSON, &local)
            .map_err(|e| BridgeError::OntologyCreateFailed {
                reason: e.to_string(),
                compensated: true,
            })?;

        if let Err(create) = self.binder.apply(&insert) {
            // A timed-out insert is still queued on the worker and commits
            // late. The retraction queues behind it.
            warn!("creating individual {} failed: {}; retracting", local, create);
            let compensated = match self.retract(&local) {
                Ok(()) => true,
                Err(retract) => {
                    warn!("retracting individual {} not confirmed: {}", local, retract);
                    false
                }
            };
            return Err(BridgeError::OntologyCreateFailed {
                reason: create.to_string(),
                compensated,
            });
        }

        let qualified = self.builder.qualify(&local, "individual")?;
        let alias = match QualifiedName::split(&qualified) {
            Ok(name) => name.into_local(),
            Err(e) => {
                warn!("cannot extract alias from {}: {}; retracting", qualified, e);
                let compensated = self.retract(&local).is_ok();
                return Err(BridgeError::AliasExtractionFailed {
                    name: qualified,
                    compensated,
                });
            }
        };

        if let Err(persist) = self.directory.update(
            &self.table,
            &[(USER_COLUMN, username)],
            &[(ALIAS_COLUMN, alias.as_str())],
        ) {
            warn!(
                "persisting alias {} for '{}' failed: {}; retracting individual",
                alias, username, persist
            );
            return Err(match self.retract(&alias) {
                Ok(()) => BridgeError::PersistFailed(persist.to_string()),
                Err(retract) => BridgeError::CompensationFailed {
                    individual: alias,
                    persist: persist.to_string(),
                    retract: retract.to_string(),
                },
            });
        }

        info!("created ontology alias {} for '{}'", alias, username);

        if let Err(e) = self.persistence.dump_default() {
            warn!("ontology dump after alias creation failed: {}", e);
        }

        Ok(alias)
    }

    fn retract(&self, local: &str) -> Result<()> {
        let retract = self.builder.retract_individual(local)?;
        self.binder.apply(&retract)
    }
}
