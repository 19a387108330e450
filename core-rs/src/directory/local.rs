//! LocalUserDirectory - in-process tables, optionally backed by YAML
//!
//! File layout:
//! ```yaml
//! tbl_user:
//!   - username: alice
//!     ontology_alias: None
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use super::traits::{ColumnValue, UserDirectory};
use crate::errors::{BridgeError, Result};

/// Column name → value
pub type Row = BTreeMap<String, String>;

type Tables = BTreeMap<String, Vec<Row>>;

pub struct LocalUserDirectory {
    tables: Mutex<Tables>,
    path: Option<PathBuf>,
}

impl Default for LocalUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalUserDirectory {
    /// Empty, memory-only directory
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::new()),
            path: None,
        }
    }

    /// Directory backed by `path`; a missing file starts empty
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let tables = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Tables::new()
            } else {
                serde_yaml::from_str(&content)?
            }
        } else {
            Tables::new()
        };

        Ok(Self {
            tables: Mutex::new(tables),
            path: Some(path),
        })
    }

    /// Append a row built from `(column, value)` pairs
    pub fn insert(&self, table: &str, row: &[ColumnValue<'_>]) -> Result<()> {
        let row: Row = row
            .iter()
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();

        let mut tables = self.lock()?;
        tables.entry(table.to_string()).or_default().push(row);
        self.persist(&tables)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| BridgeError::Directory("directory lock poisoned".to_string()))
    }

    fn persist(&self, tables: &Tables) -> Result<()> {
        if let Some(path) = &self.path {
            fs::write(path, serde_yaml::to_string(tables)?)?;
            debug!("user directory written to {}", path.display());
        }
        Ok(())
    }

    fn matches(row: &Row, filter: &[ColumnValue<'_>]) -> bool {
        filter
            .iter()
            .all(|(column, value)| row.get(*column).map(String::as_str) == Some(*value))
    }
}

impl UserDirectory for LocalUserDirectory {
    fn fetch(&self, table: &str, filter: &[ColumnValue<'_>], columns: &[&str]) -> Result<Vec<Vec<String>>> {
        let tables = self.lock()?;
        // A table nobody has written yet has no rows.
        let rows = match tables.get(table) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        rows.iter()
            .filter(|row| Self::matches(row, filter))
            .map(|row| {
                columns
                    .iter()
                    .map(|column| {
                        row.get(*column).cloned().ok_or_else(|| {
                            BridgeError::Directory(format!("unknown column '{}' in '{}'", column, table))
                        })
                    })
                    .collect::<Result<Vec<String>>>()
            })
            .collect()
    }

    fn update(&self, table: &str, filter: &[ColumnValue<'_>], set: &[ColumnValue<'_>]) -> Result<()> {
        let mut tables = self.lock()?;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| BridgeError::Directory(format!("unknown table '{}'", table)))?;

        let mut updated = 0;
        for row in rows.iter_mut().filter(|row| Self::matches(row, filter)) {
            for (column, value) in set {
                row.insert(column.to_string(), value.to_string());
            }
            updated += 1;
        }

        if updated == 0 {
            return Err(BridgeError::Directory(format!("no rows of '{}' matched the update", table)));
        }

        self.persist(&tables)
    }
}
