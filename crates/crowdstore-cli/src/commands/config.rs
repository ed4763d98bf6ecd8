//! Configuration inspection commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use crowdstore_core::config::AppConfig;
use crowdstore_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,
    /// Validate the storage section
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => output::print_item(config, format),
        ConfigCommand::Validate => {
            match config.storage.backend.as_str() {
                "couchdb" => {
                    let url = config.storage.couchdb.endpoint()?;
                    output::print_success(&format!("CouchDB endpoint {} is valid", url));
                }
                "local" => output::print_success(&format!(
                    "Local store rooted at {}",
                    config.storage.local.root_path
                )),
                other => {
                    return Err(AppError::configuration(format!(
                        "Unknown storage backend '{}'",
                        other
                    )));
                }
            }
        }
    }

    Ok(())
}
