//! Metadata document writes.

use reqwest::{Client, StatusCode};
use tracing::debug;

use crowdstore_core::error::AppError;
use crowdstore_core::result::AppResult;
use crowdstore_core::types::JobIdentity;

use super::endpoint::CouchEndpoint;
use super::wire::{self, FileDocument, WriteResponse};

/// Creates and deletes the per-file metadata documents.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    http: Client,
    endpoint: CouchEndpoint,
}

impl DocumentClient {
    /// Create a document client for the given database.
    pub fn new(http: Client, endpoint: CouchEndpoint) -> Self {
        Self { http, endpoint }
    }

    /// Create the document `id` with body `{"job": ...}` and return its
    /// revision.
    pub async fn create(&self, id: &str, job: &JobIdentity) -> AppResult<String> {
        let url = self.endpoint.document(id);
        debug!(document = id, %job, "Creating metadata document");

        let response = self
            .http
            .put(&url)
            .json(&FileDocument { job })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(wire::failure(response, &format!("Creating document '{id}'")).await);
        }

        let written: WriteResponse = wire::decode(response, "document create").await?;
        debug!(document = %written.id, rev = %written.rev, "Created metadata document");
        Ok(written.rev)
    }

    /// Delete the document `id`, provided `rev` is still its current revision.
    ///
    /// A document that is already gone counts as a conflict: the revision the
    /// caller holds no longer matches anything in the store.
    pub async fn delete(&self, id: &str, rev: &str) -> AppResult<()> {
        let url = self.endpoint.document_at(id, rev);
        debug!(document = id, rev, "Deleting document");

        let response = self.http.delete(&url).send().await?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(AppError::store_conflict(format!(
                "Document '{id}' at revision {rev} no longer exists"
            ))),
            _ => Err(wire::failure(response, &format!("Deleting document '{id}'")).await),
        }
    }
}
