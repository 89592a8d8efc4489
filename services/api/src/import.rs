use crate::infra::import_service;
use clap::Args;
use lead_intake::config::AppConfig;
use lead_intake::error::AppError;
use lead_intake::leads::ImportOutcome;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// CSV file with a header row (fullName, email, phone, ...)
    pub(crate) path: PathBuf,
}

/// Runs a local file through the same pipeline as the upload endpoint and prints the
/// JSON result. A rejected batch is reported as an error so the exit code is non-zero.
pub(crate) async fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let bytes = tokio::fs::read(&args.path).await?;

    let service = import_service(&config.database).await?;
    let outcome = service.import_csv(&bytes).await?;

    println!("{:#}", outcome.body());

    match outcome {
        ImportOutcome::Committed { .. } => Ok(()),
        ImportOutcome::Rejected { errors } => Err(AppError::ImportRejected { rows: errors.len() }),
    }
}
