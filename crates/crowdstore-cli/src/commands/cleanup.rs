//! Job cleanup command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use crowdstore_core::config::AppConfig;
use crowdstore_core::error::AppError;
use crowdstore_core::types::JobRef;

/// Arguments for the cleanup command
#[derive(Debug, Args)]
pub struct CleanupArgs {
    /// Action the job ran
    #[arg(short, long)]
    pub action: String,

    /// Numeric job id
    #[arg(short, long)]
    pub job_id: u64,
}

/// Deleted file display row
#[derive(Debug, Serialize, Tabled)]
struct DeletedRow {
    /// Removed file
    deleted: String,
}

/// Execute the cleanup command
pub async fn execute(
    args: &CleanupArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::open_store(config).await?;
    let job = JobRef::new(args.action.clone(), args.job_id);
    let report = store.cleanup(&job).await?;

    let rows: Vec<DeletedRow> = report
        .deleted
        .iter()
        .map(|id| DeletedRow { deleted: id.clone() })
        .collect();
    output::print_list(&rows, format);

    if format == OutputFormat::Table {
        output::print_success(&format!(
            "Removed {} file(s) of {}",
            report.deleted_count(),
            report.job
        ));
    }
    Ok(())
}
