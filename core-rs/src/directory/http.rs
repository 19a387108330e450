//! HttpUserDirectory - blocking JSON client for the relational data service
//!
//! Endpoints (POST, JSON bodies):
//! - `<base>/fetch`  `{table, where_data, req_cols}`
//! - `<base>/update` `{table, where_data, set_cols}`
//!
//! Both answer `{success, res_data, trace, error}`.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::traits::{ColumnValue, UserDirectory};
use crate::errors::{BridgeError, Result};

#[derive(Debug, Serialize)]
struct FetchRequest<'a> {
    table: &'a str,
    where_data: Vec<[&'a str; 2]>,
    req_cols: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    table: &'a str,
    where_data: Vec<[&'a str; 2]>,
    set_cols: Vec<[&'a str; 2]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServiceResponse {
    success: bool,
    res_data: Vec<Vec<String>>,
    trace: Vec<String>,
    error: String,
}

fn pairs<'a>(values: &[ColumnValue<'a>]) -> Vec<[&'a str; 2]> {
    values.iter().map(|(column, value)| [*column, *value]).collect()
}

/// HTTP client for the relational data service
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpUserDirectory {
    /// Create a client for the service at `base_url`
    ///
    /// # Example
    ///
    /// ```
    /// use ontobridge_core::directory::HttpUserDirectory;
    /// use std::time::Duration;
    ///
    /// let directory = HttpUserDirectory::new("http://localhost:9001/users/", Duration::from_secs(5)).unwrap();
    /// assert_eq!(directory.base_url(), "http://localhost:9001/users");
    /// ```
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(BridgeError::Config("directory url cannot be empty".to_string()));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Directory(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn call<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<ServiceResponse> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("user directory request: POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| BridgeError::Directory(format!("{} unreachable: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(BridgeError::Directory(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }

        let parsed: ServiceResponse = response
            .json()
            .map_err(|e| BridgeError::Directory(format!("invalid response from {}: {}", url, e)))?;

        if !parsed.success {
            let reason = if parsed.error.is_empty() {
                parsed.trace.first().cloned().unwrap_or_else(|| "request failed".to_string())
            } else {
                parsed.error
            };
            return Err(BridgeError::Directory(reason));
        }

        Ok(parsed)
    }
}

impl UserDirectory for HttpUserDirectory {
    fn fetch(&self, table: &str, filter: &[ColumnValue<'_>], columns: &[&str]) -> Result<Vec<Vec<String>>> {
        let request = FetchRequest {
            table,
            where_data: pairs(filter),
            req_cols: columns,
        };
        Ok(self.call("fetch", &request)?.res_data)
    }

    fn update(&self, table: &str, filter: &[ColumnValue<'_>], set: &[ColumnValue<'_>]) -> Result<()> {
        let request = UpdateRequest {
            table,
            where_data: pairs(filter),
            set_cols: pairs(set),
        };
        self.call("update", &request)?;
        Ok(())
    }
}
