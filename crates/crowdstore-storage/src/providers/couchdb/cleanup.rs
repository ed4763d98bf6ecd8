//! Removal of every document saved for a job.

use futures::{StreamExt, stream};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use crowdstore_core::error::AppError;
use crowdstore_core::result::AppResult;
use crowdstore_core::types::{CleanupReport, JobIdentity};

use super::document::DocumentClient;
use super::endpoint::CouchEndpoint;
use super::view::{DESIGN_DOC, FILES_BY_JOB};
use super::wire::{self, ViewResponse, ViewRow};

/// Maximum number of delete requests in flight during one cleanup.
pub const MAX_CONCURRENT_DELETES: usize = 16;

/// Looks up a job's documents through the `files_by_job` view and deletes
/// each of them.
#[derive(Debug, Clone)]
pub struct CleanupCoordinator {
    http: Client,
    endpoint: CouchEndpoint,
    documents: DocumentClient,
}

impl CleanupCoordinator {
    /// Create a coordinator that deletes through `documents`.
    pub fn new(http: Client, endpoint: CouchEndpoint, documents: DocumentClient) -> Self {
        Self {
            http,
            endpoint,
            documents,
        }
    }

    /// List the documents indexed under `job`.
    pub async fn files_for(&self, job: &JobIdentity) -> AppResult<Vec<ViewRow>> {
        let response = self
            .http
            .get(self.endpoint.files_by_job(job.as_str()))
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => {
                let view: ViewResponse = wire::decode(response, "files_by_job view").await?;
                Ok(view.rows)
            }
            StatusCode::NOT_FOUND => Err(AppError::view_missing(format!(
                "View '_design/{DESIGN_DOC}/_view/{FILES_BY_JOB}' is not installed; run init-db first"
            ))),
            _ => Err(wire::failure(response, "Querying files_by_job view").await),
        }
    }

    /// Delete every document of `job`.
    ///
    /// Each delete carries its own revision and runs independently, at most
    /// [`MAX_CONCURRENT_DELETES`] at a time; one failure does not stop the
    /// others. If any delete fails the result is a
    /// `PartialCleanup` error listing the ids left behind.
    pub async fn cleanup(&self, job: &JobIdentity) -> AppResult<CleanupReport> {
        let rows = self.files_for(job).await?;
        debug!(%job, documents = rows.len(), "Deleting job documents");

        let deletes: Vec<_> = rows
            .iter()
            .map(|row| self.documents.delete(&row.id, &row.value.rev))
            .collect();
        let results: Vec<AppResult<()>> = stream::iter(deletes)
            .buffered(MAX_CONCURRENT_DELETES)
            .collect()
            .await;

        let total = rows.len();
        let mut deleted = Vec::with_capacity(total);
        let mut failed = Vec::new();
        for (row, result) in rows.into_iter().zip(results) {
            match result {
                Ok(()) => deleted.push(row.id),
                Err(e) => {
                    warn!(%job, document = %row.id, error = %e, "Failed to delete document");
                    failed.push(row.id);
                }
            }
        }

        if !failed.is_empty() {
            return Err(AppError::partial_cleanup(
                format!("{} of {total} documents of job {job} could not be deleted", failed.len()),
                failed,
            ));
        }

        info!(%job, deleted = deleted.len(), "Cleaned up job");
        Ok(CleanupReport {
            job: job.clone(),
            deleted,
        })
    }
}
