//! Installation of the `files_by_job` lookup view.

use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crowdstore_core::error::AppError;
use crowdstore_core::result::AppResult;

use super::endpoint::CouchEndpoint;
use super::wire::{self, DesignDocument, ViewDefinition};

/// Name of the design document holding the lookup view.
pub const DESIGN_DOC: &str = "cloudcrowd";

/// Name of the view that indexes saved files by job identity.
pub const FILES_BY_JOB: &str = "files_by_job";

/// Map function of [`FILES_BY_JOB`]: key is the document's `job` field, value
/// carries the revision needed to delete it.
pub const FILES_BY_JOB_MAP: &str = "function(doc){ emit(doc.job, {rev: doc._rev}); }";

/// Installs the design document cleanup depends on.
#[derive(Debug, Clone)]
pub struct ViewInitializer {
    http: Client,
    endpoint: CouchEndpoint,
}

impl ViewInitializer {
    /// Create a view initializer for the given database.
    pub fn new(http: Client, endpoint: CouchEndpoint) -> Self {
        Self { http, endpoint }
    }

    /// The view definition this backend expects.
    pub fn files_by_job() -> ViewDefinition {
        ViewDefinition {
            map: FILES_BY_JOB_MAP.to_string(),
            reduce: None,
        }
    }

    /// Install the `files_by_job` view unless an identical one is already
    /// present. Other views in the design document are preserved.
    pub async fn ensure_view(&self) -> AppResult<()> {
        let wanted = Self::files_by_job();

        let mut design = match self.fetch().await? {
            Some(existing) if existing.views.get(FILES_BY_JOB) == Some(&wanted) => {
                debug!(design = DESIGN_DOC, "Lookup view already installed");
                return Ok(());
            }
            Some(existing) => existing,
            None => DesignDocument::default(),
        };
        design.views.insert(FILES_BY_JOB.to_string(), wanted.clone());

        let url = self.endpoint.design();
        let response = self.http.put(&url).json(&design).send().await?;

        match response.status() {
            s if s.is_success() => {
                info!(design = DESIGN_DOC, view = FILES_BY_JOB, "Installed lookup view");
                Ok(())
            }
            StatusCode::CONFLICT => {
                // Another installer won the race; fine if it wrote the same view.
                match self.fetch().await? {
                    Some(current) if current.views.get(FILES_BY_JOB) == Some(&wanted) => Ok(()),
                    _ => Err(AppError::store_conflict(format!(
                        "Design document '_design/{DESIGN_DOC}' was modified concurrently"
                    ))),
                }
            }
            _ => Err(wire::failure(response, "Installing lookup view").await),
        }
    }

    /// Fetch the design document, or `None` if it does not exist.
    pub async fn fetch(&self) -> AppResult<Option<DesignDocument>> {
        let response = self.http.get(self.endpoint.design()).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(wire::decode(response, "design document").await?)),
            _ => Err(wire::failure(response, "Reading lookup view").await),
        }
    }
}
