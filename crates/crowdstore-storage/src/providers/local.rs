//! Local filesystem asset store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use crowdstore_core::error::{AppError, ErrorKind};
use crowdstore_core::result::AppResult;
use crowdstore_core::traits::AssetStore;
use crowdstore_core::types::{CleanupReport, JobRef, SavePath};
use crowdstore_core::Url;

/// Asset store that copies files under a root directory, laid out by save path.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    /// Root directory for all stored files.
    root: PathBuf,
}

impl LocalAssetStore {
    /// Create a new local store rooted at the given path.
    pub async fn new(root_path: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        let root = fs::canonicalize(&root).await?;
        Ok(Self { root })
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a save path to a location under the root, refusing `.` and
    /// `..` components so nothing is written outside it.
    fn resolve(&self, path: &SavePath) -> AppResult<PathBuf> {
        let relative = path.to_string();
        if relative.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
            return Err(AppError::validation(format!(
                "Save path '{relative}' contains empty, '.' or '..' components"
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Every file below `dir`, as `/`-separated paths relative to the root.
    async fn files_under(&self, dir: &Path) -> AppResult<Vec<String>> {
        let mut files = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let mut entries = fs::read_dir(&current).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to list directory: {}", current.display()),
                    e,
                )
            })?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    let parts: Vec<_> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect();
                    files.push(parts.join("/"));
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    fn store_type(&self) -> &str {
        "local"
    }

    async fn initialize(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn save(&self, local_path: &Path, save_path: &str) -> AppResult<String> {
        let path = SavePath::parse(save_path)?;
        let dest = self.resolve(&path)?;
        self.ensure_parent(&dest).await?;

        let bytes = fs::copy(local_path, &dest).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Local file not found: {}", local_path.display()))
            } else {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to copy {} -> {save_path}", local_path.display()),
                    e,
                )
            }
        })?;
        debug!(save_path, bytes, "Copied file");

        let locator = Url::from_file_path(&dest).map_err(|()| {
            AppError::internal(format!("Cannot build file URL for {}", dest.display()))
        })?;
        info!(local = %local_path.display(), %locator, "Saved file");
        Ok(locator.to_string())
    }

    async fn cleanup(&self, job: &JobRef) -> AppResult<CleanupReport> {
        if job.action.is_empty() || job.action.contains(['/', '\\']) || job.action == ".." {
            return Err(AppError::validation(format!("Invalid action name '{}'", job.action)));
        }
        let identity = job.identity();
        let dir = self.root.join(&job.action).join(job.job_segment());

        if !fs::try_exists(&dir).await? {
            debug!(job = %identity, "Nothing to clean up");
            return Ok(CleanupReport {
                job: identity,
                deleted: Vec::new(),
            });
        }

        let deleted = self.files_under(&dir).await?;
        fs::remove_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete directory: {}", dir.display()),
                e,
            )
        })?;

        info!(job = %identity, deleted = deleted.len(), "Cleaned up job");
        Ok(CleanupReport {
            job: identity,
            deleted,
        })
    }
}
