//! Asset store trait for pluggable job-output backends.

use std::path::Path;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{CleanupReport, JobRef};

/// Trait for backends that persist the files produced by work units.
///
/// A backend is constructed from an explicit configuration value and then
/// used through this interface. The backend in use is chosen at
/// configuration time; callers never depend on a concrete type.
#[async_trait]
pub trait AssetStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "couchdb", "local").
    fn store_type(&self) -> &str;

    /// Perform one-time administrative setup. Safe to call repeatedly.
    async fn initialize(&self) -> AppResult<()>;

    /// Save the file at `local_path` under the logical `save_path`
    /// (`action/job/unit/filename`) and return a locator for retrieving it.
    async fn save(&self, local_path: &Path, save_path: &str) -> AppResult<String>;

    /// Remove every file saved for `job`.
    async fn cleanup(&self, job: &JobRef) -> AppResult<CleanupReport>;
}
