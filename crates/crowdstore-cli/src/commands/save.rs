//! File save command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::output::{self, OutputFormat};
use crowdstore_core::config::AppConfig;
use crowdstore_core::error::AppError;

/// Arguments for the save command
#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Path to the local file to save
    pub file: PathBuf,

    /// Logical save path: action/job/unit/filename
    pub save_path: String,
}

/// Result of a save
#[derive(Debug, Serialize)]
struct Saved<'a> {
    save_path: &'a str,
    locator: String,
}

/// Execute the save command
pub async fn execute(
    args: &SaveArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::open_store(config).await?;
    let locator = store.save(&args.file, &args.save_path).await?;

    match format {
        OutputFormat::Table => output::print_success(&format!("Saved to {}", locator)),
        OutputFormat::Json => output::print_item(
            &Saved {
                save_path: &args.save_path,
                locator,
            },
            format,
        ),
    }
    Ok(())
}
