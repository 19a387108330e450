/**
 * config.rs
 * Bridge configuration (YAML)
 *
 * Format (every key optional):
 * ```yaml
 * namespace: http://knowrob.org/kb/knowrob.owl#
 * ontologyRoot: /home/rapp/rapp_platform_files
 * assetsRoot: /home/rapp/rapp_cognitive_exercise
 * defaultDump: currentOntologyVersion.ttl
 * queryTimeoutMs: 10000
 * userTable: tbl_user
 * directory:
 *   kind: http
 *   url: http://localhost:9001/user_directory
 *   timeoutMs: 5000
 * ```
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{BridgeError, Result};
use crate::ontology::query::DEFAULT_NAMESPACE;

pub const DEFAULT_DUMP_FILE: &str = "currentOntologyVersion.ttl";
pub const DEFAULT_USER_TABLE: &str = "tbl_user";
const DEFAULT_QUERY_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5_000;

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Where the user→alias mapping lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DirectoryConfig {
    /// In-process table, optionally backed by a YAML file
    Local {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    /// Remote relational data service
    Http {
        url: String,
        #[serde(rename = "timeoutMs", default = "default_http_timeout")]
        timeout_ms: u64,
    },
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        DirectoryConfig::Local { path: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    pub namespace: String,
    /// Root for every ontology dump/load path
    pub ontology_root: PathBuf,
    /// Root cognitive-test asset paths are resolved against
    pub assets_root: PathBuf,
    pub default_dump: String,
    pub query_timeout_ms: u64,
    pub user_table: String,
    pub directory: DirectoryConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let root = home_dir().join("rapp_platform_files");
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            assets_root: root.join("cognitive_exercises"),
            ontology_root: root,
            default_dump: DEFAULT_DUMP_FILE.to_string(),
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            user_table: DEFAULT_USER_TABLE.to_string(),
            directory: DirectoryConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Load and validate a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BridgeError::FileNotFound(path.to_string_lossy().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let config: BridgeConfig = serde_yaml::from_str(&content)
            .map_err(|e| BridgeError::Config(format!("Invalid config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Ensures:
    /// - namespace ends with its only `#`
    /// - query timeout is non-zero
    /// - default dump name and user table are non-empty
    pub fn validate(&self) -> Result<()> {
        if !self.namespace.ends_with('#') || self.namespace.matches('#').count() != 1 {
            return Err(BridgeError::Config(format!(
                "namespace '{}' must contain exactly one '#', at the end",
                self.namespace
            )));
        }

        if self.query_timeout_ms == 0 {
            return Err(BridgeError::Config("queryTimeoutMs must be positive".to_string()));
        }

        if self.default_dump.trim().is_empty() {
            return Err(BridgeError::Config("defaultDump cannot be empty".to_string()));
        }

        if self.user_table.trim().is_empty() {
            return Err(BridgeError::Config("userTable cannot be empty".to_string()));
        }

        if let DirectoryConfig::Http { url, timeout_ms } = &self.directory {
            if url.trim().is_empty() {
                return Err(BridgeError::Config("directory url cannot be empty".to_string()));
            }
            if *timeout_ms == 0 {
                return Err(BridgeError::Config("directory timeoutMs must be positive".to_string()));
            }
        }

        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}
