//! CLI command definitions and dispatch.

pub mod cleanup;
pub mod config;
pub mod init_db;
pub mod save;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::output::OutputFormat;
use crowdstore_core::config::AppConfig;
use crowdstore_core::error::AppError;
use crowdstore_core::traits::AssetStore;

/// crowdstore — job output storage for distributed workers
#[derive(Debug, Parser)]
#[command(name = "crowdstore", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay (reads `config/{env}.toml`)
    #[arg(short, long, env = "CROWDSTORE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Prepare the configured store (installs the lookup view for CouchDB)
    InitDb(init_db::InitDbArgs),
    /// Save a local file under a logical save path
    Save(save::SaveArgs),
    /// Delete every file saved for a job
    Cleanup(cleanup::CleanupArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Load configuration from the selected file and environment
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config, &self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        debug!(
            command = ?self.command,
            backend = %config.storage.backend,
            env = %self.env,
            "Dispatching command"
        );
        match &self.command {
            Commands::InitDb(args) => init_db::execute(args, config).await,
            Commands::Save(args) => save::execute(args, config, self.format).await,
            Commands::Cleanup(args) => cleanup::execute(args, config, self.format).await,
            Commands::Config(args) => config::execute(args, config, self.format),
        }
    }
}

/// Helper: build the configured asset store
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn AssetStore>, AppError> {
    crowdstore_storage::build_asset_store(&config.storage).await
}
