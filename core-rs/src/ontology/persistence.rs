/**
 * persistence.rs
 * Dump and load the whole knowledge store under a fixed root directory
 */

use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use super::engine::StoreHandle;
use crate::errors::{BridgeError, Result};

pub struct PersistenceController {
    root: PathBuf,
    default_file: String,
    store: StoreHandle,
}

impl PersistenceController {
    pub fn new(root: impl Into<PathBuf>, default_file: impl Into<String>, store: StoreHandle) -> Self {
        Self {
            root: root.into(),
            default_file: default_file.into(),
            store,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the automatic post-mutation dump writes to
    pub fn default_path(&self) -> PathBuf {
        self.root.join(&self.default_file)
    }

    /// Resolve a caller path under the root.
    ///
    /// Absolute paths and `..` components are rejected so nothing escapes
    /// the root; the parent directory must already exist.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        if relative.trim().is_empty() {
            return Err(BridgeError::MalformedInput("path is empty".to_string()));
        }

        let candidate = Path::new(relative);
        for component in candidate.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(BridgeError::MalformedInput(format!(
                        "path '{}' must stay under the ontology root",
                        relative
                    )))
                }
            }
        }

        let resolved = self.root.join(candidate);
        let parent_exists = resolved.parent().map(Path::is_dir).unwrap_or(false);
        if !parent_exists {
            return Err(BridgeError::PathNotFound(format!(
                "parent directory of {} does not exist",
                resolved.display()
            )));
        }

        Ok(resolved)
    }

    /// Serialize the store to `relative` under the root
    pub fn dump(&self, relative: &str) -> Result<PathBuf> {
        let path = self.resolve(relative)?;
        self.dump_to(path)
    }

    /// Serialize the store to the default dump file
    pub fn dump_default(&self) -> Result<PathBuf> {
        let path = self.resolve(&self.default_file)?;
        self.dump_to(path)
    }

    fn dump_to(&self, path: PathBuf) -> Result<PathBuf> {
        debug!("dumping ontology to {}", path.display());
        self.store.dump(path.clone())?;
        info!("ontology dumped to {}", path.display());
        Ok(path)
    }

    /// Merge the file at `relative` under the root into the store
    pub fn load(&self, relative: &str) -> Result<PathBuf> {
        let path = self.resolve(relative)?;
        if !path.is_file() {
            return Err(BridgeError::FileNotFound(path.display().to_string()));
        }

        debug!("loading ontology from {}", path.display());
        self.store.load(path.clone())?;
        info!("ontology loaded from {}", path.display());
        Ok(path)
    }

    /// Load the default dump when one exists; returns whether it did
    pub fn load_default_if_present(&self) -> Result<bool> {
        if !self.default_path().is_file() {
            return Ok(false);
        }
        let default_file = self.default_file.clone();
        self.load(&default_file)?;
        Ok(true)
    }
}
