/**
 * names.rs
 * Qualified names (`namespace#local`) and minting of new individual names
 */

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::errors::{BridgeError, Result};

/// Separator between namespace and local name
pub const SEPARATOR: char = '#';

/// Length of the random suffix appended to minted individual names
const SUFFIX_LEN: usize = 8;

/// A knowledge-store identifier split into namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    namespace: String,
    local: String,
}

impl QualifiedName {
    /// Split a qualified name on its `#` separator.
    ///
    /// Exactly one separator with non-empty parts on both sides is accepted;
    /// anything else is `Malformed`.
    ///
    /// # Example
    /// ```
    /// use ontobridge_core::ontology::QualifiedName;
    ///
    /// let name = QualifiedName::split("http://x#Person_1").unwrap();
    /// assert_eq!(name.namespace(), "http://x");
    /// assert_eq!(name.local(), "Person_1");
    /// assert!(QualifiedName::split("no-hash-here").is_err());
    /// ```
    pub fn split(name: &str) -> Result<Self> {
        let (namespace, local) = name
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| BridgeError::Malformed(format!("'{}' has no '{}' separator", name, SEPARATOR)))?;

        if namespace.contains(SEPARATOR) {
            return Err(BridgeError::Malformed(format!(
                "'{}' has more than one '{}' separator",
                name, SEPARATOR
            )));
        }

        if namespace.is_empty() || local.is_empty() {
            return Err(BridgeError::Malformed(format!("'{}' has an empty part", name)));
        }

        Ok(Self {
            namespace: namespace.to_string(),
            local: local.to_string(),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn into_local(self) -> String {
        self.local
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.namespace, SEPARATOR, self.local)
    }
}

/// Mint a fresh local name for an individual of `class`, e.g. `Person_aB3xY9qZ`
pub fn mint_local_name(class: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}_{}", class, suffix)
}
