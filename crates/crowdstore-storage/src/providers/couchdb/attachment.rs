//! Standalone attachment uploads.
//!
//! The file body is streamed straight from disk, so large outputs never have
//! to be buffered or base64-encoded.

use std::path::Path;

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crowdstore_core::error::{AppError, ErrorKind};
use crowdstore_core::result::AppResult;

use super::endpoint::CouchEndpoint;
use super::wire;

/// Uploads file contents as binary attachments to existing documents.
#[derive(Debug, Clone)]
pub struct AttachmentUploader {
    http: Client,
    endpoint: CouchEndpoint,
}

impl AttachmentUploader {
    /// Create an uploader for the given database.
    pub fn new(http: Client, endpoint: CouchEndpoint) -> Self {
        Self { http, endpoint }
    }

    /// Stream the file at `local_path` to `id/filename` at revision `rev`.
    ///
    /// The content type is inferred from the local file's extension and the
    /// length from its metadata. The open file is owned by the request body
    /// and closed when the request completes or fails.
    pub async fn attach_file(
        &self,
        id: &str,
        rev: &str,
        filename: &str,
        local_path: &Path,
    ) -> AppResult<String> {
        let file = File::open(local_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to open {}", local_path.display()),
                e,
            )
        })?;
        let length = file
            .metadata()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to stat {}", local_path.display()),
                    e,
                )
            })?
            .len();
        let content_type = mime_guess::from_path(local_path).first_or_octet_stream();

        self.attach(
            id,
            rev,
            filename,
            content_type.essence_str(),
            length,
            Body::wrap_stream(ReaderStream::new(file)),
        )
        .await
    }

    /// Upload `body` as attachment `filename` of document `id` and return the
    /// attachment's URL.
    pub async fn attach(
        &self,
        id: &str,
        rev: &str,
        filename: &str,
        content_type: &str,
        length: u64,
        body: impl Into<Body>,
    ) -> AppResult<String> {
        let locator = self.endpoint.attachment(id, filename);
        let url = format!("{locator}?rev={}", super::endpoint::escape_component(rev));
        debug!(document = id, filename, content_type, length, "Uploading attachment");

        let response = self
            .http
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, length)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(wire::failure(response, &format!("Attaching '{filename}' to '{id}'")).await);
        }

        Ok(locator)
    }
}
