//! Backend selection: builds the configured asset store.

use std::sync::Arc;

use tracing::info;

use crowdstore_core::config::storage::StorageConfig;
use crowdstore_core::error::AppError;
use crowdstore_core::result::AppResult;
use crowdstore_core::traits::AssetStore;

/// Build the asset store named by `config.backend`.
pub async fn build_asset_store(config: &StorageConfig) -> AppResult<Arc<dyn AssetStore>> {
    let store: Arc<dyn AssetStore> = match config.backend.as_str() {
        #[cfg(feature = "couchdb")]
        "couchdb" => Arc::new(crate::providers::CouchDbStore::new(&config.couchdb)?),
        #[cfg(feature = "local")]
        "local" => Arc::new(crate::providers::LocalAssetStore::new(&config.local.root_path).await?),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown or disabled storage backend '{other}'"
            )));
        }
    };

    info!(backend = store.store_type(), "Asset store ready");
    Ok(store)
}
