//! Directory module for the user→alias mapping
//!
//! Provides the row-oriented `UserDirectory` trait and implementations:
//! - LocalUserDirectory: in-process tables, optionally YAML backed
//! - HttpUserDirectory: remote relational data service

mod http;
mod local;
mod traits;

pub use http::HttpUserDirectory;
pub use local::{LocalUserDirectory, Row};
pub use traits::{ColumnValue, UserDirectory};

use std::sync::Arc;
use std::time::Duration;

use crate::config::DirectoryConfig;
use crate::errors::Result;

/// Build the directory described by `config`
pub fn from_config(config: &DirectoryConfig) -> Result<Arc<dyn UserDirectory>> {
    Ok(match config {
        DirectoryConfig::Local { path: Some(path) } => Arc::new(LocalUserDirectory::open(path)?),
        DirectoryConfig::Local { path: None } => Arc::new(LocalUserDirectory::new()),
        DirectoryConfig::Http { url, timeout_ms } => {
            Arc::new(HttpUserDirectory::new(url, Duration::from_millis(*timeout_ms))?)
        }
    })
}
