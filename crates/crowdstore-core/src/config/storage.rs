//! Asset store backend configuration.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::result::AppResult;

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend to use: `"couchdb"` or `"local"`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// CouchDB backend configuration.
    #[serde(default)]
    pub couchdb: CouchDbConfig,
    /// Local filesystem backend configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            couchdb: CouchDbConfig::default(),
            local: LocalStorageConfig::default(),
        }
    }
}

/// CouchDB backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchDbConfig {
    /// URL of the database, including host, port, and database path
    /// (e.g. `http://127.0.0.1:5984/cloudcrowd`).
    #[serde(default = "default_couch_url")]
    pub url: String,
}

impl CouchDbConfig {
    /// Create a config pointing at the given database URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Parse and validate the database URL.
    pub fn endpoint(&self) -> AppResult<Url> {
        let url = Url::parse(&self.url).map_err(|e| {
            AppError::with_source(
                crate::error::ErrorKind::Configuration,
                format!("Invalid CouchDB URL '{}'", self.url),
                e,
            )
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::configuration(format!(
                "CouchDB URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(AppError::configuration(format!(
                "CouchDB URL '{}' has no host",
                self.url
            )));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(AppError::configuration(format!(
                "CouchDB URL '{}' must not carry a query or fragment",
                self.url
            )));
        }
        Ok(url)
    }
}

impl Default for CouchDbConfig {
    fn default() -> Self {
        Self {
            url: default_couch_url(),
        }
    }
}

/// Local filesystem backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    /// Root directory that saved files are copied under.
    #[serde(default = "default_local_root")]
    pub root_path: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_local_root(),
        }
    }
}

fn default_backend() -> String {
    "couchdb".to_string()
}

fn default_couch_url() -> String {
    "http://127.0.0.1:5984/cloudcrowd".to_string()
}

fn default_local_root() -> String {
    "./data/assets".to_string()
}
