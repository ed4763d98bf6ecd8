//! CouchDB asset store.
//!
//! Each saved file becomes its own document, keyed by the save path, with the
//! file stored as a standalone attachment. Saving is two requests: create the
//! metadata document, then upload the attachment at the returned revision.
//! The two steps are not atomic. When the upload fails, the metadata
//! document stays behind without an attachment until the job is cleaned up.
//!
//! Cleanup relies on the `files_by_job` view, which must be installed once per
//! database with [`AssetStore::initialize`].

pub mod attachment;
pub mod cleanup;
pub mod document;
pub mod endpoint;
pub mod view;
pub mod wire;

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{info, warn};

use crowdstore_core::config::storage::CouchDbConfig;
use crowdstore_core::error::{AppError, ErrorKind};
use crowdstore_core::result::AppResult;
use crowdstore_core::traits::AssetStore;
use crowdstore_core::types::{CleanupReport, JobRef, SavePath};

pub use attachment::AttachmentUploader;
pub use cleanup::CleanupCoordinator;
pub use document::DocumentClient;
pub use endpoint::CouchEndpoint;
pub use view::ViewInitializer;

/// Asset store backed by a single CouchDB database.
#[derive(Debug, Clone)]
pub struct CouchDbStore {
    documents: DocumentClient,
    attachments: AttachmentUploader,
    views: ViewInitializer,
    cleaner: CleanupCoordinator,
}

impl CouchDbStore {
    /// Create a store from its configuration.
    pub fn new(config: &CouchDbConfig) -> AppResult<Self> {
        let url = config.endpoint()?;
        let http = Client::builder()
            .user_agent(concat!("crowdstore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self::with_client(http, &url))
    }

    /// Create a store that issues requests through an existing client.
    pub fn with_client(http: Client, url: &Url) -> Self {
        let endpoint = CouchEndpoint::new(url);
        let documents = DocumentClient::new(http.clone(), endpoint.clone());
        Self {
            attachments: AttachmentUploader::new(http.clone(), endpoint.clone()),
            views: ViewInitializer::new(http.clone(), endpoint.clone()),
            cleaner: CleanupCoordinator::new(http, endpoint, documents.clone()),
            documents,
        }
    }

    /// Document operations of this store.
    pub fn documents(&self) -> &DocumentClient {
        &self.documents
    }

    /// Attachment uploads of this store.
    pub fn attachments(&self) -> &AttachmentUploader {
        &self.attachments
    }
}

#[async_trait]
impl AssetStore for CouchDbStore {
    fn store_type(&self) -> &str {
        "couchdb"
    }

    async fn initialize(&self) -> AppResult<()> {
        self.views.ensure_view().await
    }

    async fn save(&self, local_path: &Path, save_path: &str) -> AppResult<String> {
        let path = SavePath::parse(save_path)?;
        let metadata = match tokio::fs::metadata(local_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::not_found(format!(
                    "Local file not found: {}",
                    local_path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(AppError::validation(format!(
                "Not a regular file: {}",
                local_path.display()
            )));
        }

        let id = path.to_string();
        let rev = self.documents.create(&id, &path.job_identity()).await?;

        match self
            .attachments
            .attach_file(&id, &rev, path.filename(), local_path)
            .await
        {
            Ok(locator) => {
                info!(local = %local_path.display(), %locator, "Saved file");
                Ok(locator)
            }
            Err(e) => {
                warn!(
                    document = %id,
                    error = %e,
                    "Attachment upload failed; metadata document left without attachment"
                );
                Err(e)
            }
        }
    }

    async fn cleanup(&self, job: &JobRef) -> AppResult<CleanupReport> {
        self.cleaner.cleanup(&job.identity()).await
    }
}
