//! One-time store preparation.

use clap::Args;

use crate::output;
use crowdstore_core::config::AppConfig;
use crowdstore_core::error::AppError;

/// Arguments for the init-db command
#[derive(Debug, Args)]
pub struct InitDbArgs {}

/// Execute the init-db command
pub async fn execute(_args: &InitDbArgs, config: &AppConfig) -> Result<(), AppError> {
    let store = super::open_store(config).await?;
    store.initialize().await?;

    output::print_success(&format!("{} store initialized", store.store_type()));
    Ok(())
}
