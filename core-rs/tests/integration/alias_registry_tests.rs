//! Integration tests for the ontology alias registry
//!
//! Tests the get-or-create lifecycle against a real Oxigraph store:
//! - Idempotent creation, including concurrent callers
//! - Compensation when the directory write fails
//! - CompensationFailed when the retraction itself fails
//! - Failed or timed-out individual creation leaves nothing behind
//! - Directory errors and unknown users

use ontobridge_core::directory::{ColumnValue, LocalUserDirectory, UserDirectory};
use ontobridge_core::errors::Result;
use ontobridge_core::ontology::{KnowledgeStore, OxigraphStore, Solution, StoreError};
use ontobridge_core::{BridgeConfig, BridgeError, OntologyService};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

// ==================== Test Helper Functions ====================

/// Directory whose updates can be switched to fail
struct FlakyDirectory {
    inner: LocalUserDirectory,
    fail_updates: AtomicBool,
    updates: AtomicUsize,
}

impl FlakyDirectory {
    fn new(fail_updates: bool) -> Self {
        let inner = LocalUserDirectory::new();
        inner
            .insert("tbl_user", &[("username", "alice"), ("ontology_alias", "None")])
            .unwrap();
        inner
            .insert("tbl_user", &[("username", "bob"), ("ontology_alias", "None")])
            .unwrap();
        Self {
            inner,
            fail_updates: AtomicBool::new(fail_updates),
            updates: AtomicUsize::new(0),
        }
    }
}

impl UserDirectory for FlakyDirectory {
    fn fetch(&self, table: &str, filter: &[ColumnValue<'_>], columns: &[&str]) -> Result<Vec<Vec<String>>> {
        self.inner.fetch(table, filter, columns)
    }

    fn update(&self, table: &str, filter: &[ColumnValue<'_>], set: &[ColumnValue<'_>]) -> Result<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(BridgeError::Directory("connection reset".to_string()));
        }
        self.inner.update(table, filter, set)
    }
}

/// Store that refuses DELETE updates
struct NoRetractStore {
    inner: OxigraphStore,
}

impl KnowledgeStore for NoRetractStore {
    fn query(&mut self, query: &str) -> std::result::Result<Vec<Solution>, StoreError> {
        self.inner.query(query)
    }

    fn update(&mut self, update: &str) -> std::result::Result<(), StoreError> {
        if update.contains("DELETE") {
            return Err(StoreError::UpdateError("retraction refused".to_string()));
        }
        self.inner.update(update)
    }

    fn dump(&mut self, path: &Path) -> std::result::Result<(), StoreError> {
        self.inner.dump(path)
    }

    fn load(&mut self, path: &Path) -> std::result::Result<(), StoreError> {
        self.inner.load(path)
    }
}

/// Store whose `INSERT DATA` updates are delayed or refused
struct InsertStore {
    inner: OxigraphStore,
    delay: Duration,
    refuse: bool,
}

impl InsertStore {
    fn slow(delay: Duration) -> Self {
        Self {
            inner: OxigraphStore::with_seed().unwrap(),
            delay,
            refuse: false,
        }
    }

    fn refusing() -> Self {
        Self {
            inner: OxigraphStore::with_seed().unwrap(),
            delay: Duration::ZERO,
            refuse: true,
        }
    }
}

impl KnowledgeStore for InsertStore {
    fn query(&mut self, query: &str) -> std::result::Result<Vec<Solution>, StoreError> {
        self.inner.query(query)
    }

    fn update(&mut self, update: &str) -> std::result::Result<(), StoreError> {
        if update.contains("INSERT DATA") {
            if self.refuse {
                return Err(StoreError::UpdateError("insert refused".to_string()));
            }
            thread::sleep(self.delay);
        }
        self.inner.update(update)
    }

    fn dump(&mut self, path: &Path) -> std::result::Result<(), StoreError> {
        self.inner.dump(path)
    }

    fn load(&mut self, path: &Path) -> std::result::Result<(), StoreError> {
        self.inner.load(path)
    }
}

fn config(root: &Path) -> BridgeConfig {
    BridgeConfig {
        ontology_root: root.to_path_buf(),
        assets_root: root.to_path_buf(),
        ..BridgeConfig::default()
    }
}

fn service_with(
    temp_dir: &TempDir,
    store: Box<dyn KnowledgeStore>,
    directory: Arc<dyn UserDirectory>,
) -> OntologyService {
    OntologyService::new(config(temp_dir.path()), store, directory).unwrap()
}

/// Local names of every `Person` individual in the store
fn people(service: &OntologyService) -> Vec<String> {
    let query = service.builder().individuals_of("Person").unwrap();
    service.binder().execute(&query, &["A"]).unwrap().local_names("A")
}

// ==================== Get-or-create ====================

#[test]
fn test_alias_creation_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let directory = Arc::new(FlakyDirectory::new(false));
    let service = service_with(&temp_dir, Box::new(OxigraphStore::with_seed().unwrap()), directory.clone());

    let first = service.aliases().get_or_create("alice").unwrap();
    let second = service.aliases().get_or_create("alice").unwrap();

    assert_eq!(first, second);
    assert_eq!(people(&service), vec![first.clone()]);
    assert_eq!(directory.updates.load(Ordering::SeqCst), 1);
    assert_eq!(service.aliases().lookup("alice").unwrap(), Some(first));
}

#[test]
fn test_concurrent_callers_get_one_alias() {
    let temp_dir = TempDir::new().unwrap();
    let directory = Arc::new(FlakyDirectory::new(false));
    let service = Arc::new(service_with(
        &temp_dir,
        Box::new(OxigraphStore::with_seed().unwrap()),
        directory.clone(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            thread::spawn(move || service.aliases().get_or_create("alice").unwrap())
        })
        .collect();
    let aliases: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(aliases.iter().all(|alias| *alias == aliases[0]));
    assert_eq!(people(&service).len(), 1);
    assert_eq!(directory.updates.load(Ordering::SeqCst), 1);
}

#[test]
fn test_distinct_users_get_distinct_aliases() {
    let temp_dir = TempDir::new().unwrap();
    let service = service_with(
        &temp_dir,
        Box::new(OxigraphStore::with_seed().unwrap()),
        Arc::new(FlakyDirectory::new(false)),
    );

    let alice = service.aliases().get_or_create("alice").unwrap();
    let bob = service.aliases().get_or_create("bob").unwrap();

    assert_ne!(alice, bob);
    assert_eq!(people(&service).len(), 2);
}

#[test]
fn test_alias_creation_dumps_ontology() {
    let temp_dir = TempDir::new().unwrap();
    let service = service_with(
        &temp_dir,
        Box::new(OxigraphStore::with_seed().unwrap()),
        Arc::new(FlakyDirectory::new(false)),
    );

    service.aliases().get_or_create("alice").unwrap();
    assert!(temp_dir.path().join("currentOntologyVersion.ttl").is_file());
}

// ==================== Compensation ====================

#[test]
fn test_persist_failure_retracts_individual() {
    let temp_dir = TempDir::new().unwrap();
    let service = service_with(
        &temp_dir,
        Box::new(OxigraphStore::with_seed().unwrap()),
        Arc::new(FlakyDirectory::new(true)),
    );

    let err = service.aliases().get_or_create("alice").unwrap_err();

    assert!(matches!(err, BridgeError::PersistFailed(_)), "got {:?}", err);
    assert!(people(&service).is_empty(), "orphan individual left behind");
    assert_eq!(service.aliases().lookup("alice").unwrap(), None);
}

#[test]
fn test_failed_retraction_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let service = service_with(
        &temp_dir,
        Box::new(NoRetractStore {
            inner: OxigraphStore::with_seed().unwrap(),
        }),
        Arc::new(FlakyDirectory::new(true)),
    );

    let err = service.aliases().get_or_create("alice").unwrap_err();

    match err {
        BridgeError::CompensationFailed { individual, persist, retract } => {
            assert_eq!(people(&service), vec![individual]);
            assert!(persist.contains("connection reset"));
            assert!(retract.contains("retraction refused"));
        }
        other => panic!("expected CompensationFailed, got {:?}", other),
    }
}

#[test]
fn test_recovery_after_persist_failure() {
    let temp_dir = TempDir::new().unwrap();
    let directory = Arc::new(FlakyDirectory::new(true));
    let service = service_with(&temp_dir, Box::new(OxigraphStore::with_seed().unwrap()), directory.clone());

    assert!(service.aliases().get_or_create("alice").is_err());

    directory.fail_updates.store(false, Ordering::SeqCst);
    let alias = service.aliases().get_or_create("alice").unwrap();
    assert_eq!(people(&service), vec![alias]);
}

// ==================== Create step failures ====================

#[test]
fn test_refused_create_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let directory = Arc::new(FlakyDirectory::new(false));
    let service = service_with(&temp_dir, Box::new(InsertStore::refusing()), directory.clone());

    let err = service.aliases().get_or_create("alice").unwrap_err();

    match err {
        BridgeError::OntologyCreateFailed { reason, compensated } => {
            assert!(reason.contains("insert refused"));
            assert!(compensated);
        }
        other => panic!("expected OntologyCreateFailed, got {:?}", other),
    }
    assert_eq!(directory.updates.load(Ordering::SeqCst), 0);
    assert!(people(&service).is_empty());
    assert_eq!(service.aliases().lookup("alice").unwrap(), None);
}

#[test]
fn test_timed_out_create_leaves_no_individual() {
    let temp_dir = TempDir::new().unwrap();
    let directory = Arc::new(FlakyDirectory::new(false));
    let config = BridgeConfig {
        query_timeout_ms: 50,
        ..config(temp_dir.path())
    };
    let service = OntologyService::new(
        config,
        Box::new(InsertStore::slow(Duration::from_millis(300))),
        directory.clone(),
    )
    .unwrap();

    let err = service.aliases().get_or_create("alice").unwrap_err();
    assert!(matches!(err, BridgeError::OntologyCreateFailed { .. }), "got {:?}", err);
    assert_eq!(directory.updates.load(Ordering::SeqCst), 0);

    // Let the worker finish the late insert and the retraction queued behind it
    thread::sleep(Duration::from_millis(600));

    assert!(people(&service).is_empty(), "late insert left an individual");
    assert_eq!(service.aliases().lookup("alice").unwrap(), None);
}

// ==================== Lookup failures ====================

#[test]
fn test_unknown_user_is_not_created() {
    let temp_dir = TempDir::new().unwrap();
    let service = service_with(
        &temp_dir,
        Box::new(OxigraphStore::with_seed().unwrap()),
        Arc::new(FlakyDirectory::new(false)),
    );

    let err = service.aliases().get_or_create("mallory").unwrap_err();
    assert!(matches!(err, BridgeError::UserNotFound(_)));
    assert!(people(&service).is_empty());
}

#[test]
fn test_alias_operation_envelope() {
    let temp_dir = TempDir::new().unwrap();
    let service = service_with(
        &temp_dir,
        Box::new(OxigraphStore::with_seed().unwrap()),
        Arc::new(FlakyDirectory::new(true)),
    );

    let response = service.create_ontology_alias(&ontobridge_core::service::CreateAliasRequest {
        username: "alice".to_string(),
    });

    assert!(!response.success);
    assert!(response.data.ontology_alias.is_empty());
    assert!(response.error.contains("Alias persistence failed"));
}
