//! Import command implementation
//!
//! This module implements the `import` command, which loads a delimited
//! product file into the configured store.

use super::{connect, error_exit_code, print_summary, status_exit_code, EXIT_CONFIG, EXIT_FATAL};
use crate::core::batch::JobLauncher;
use crate::core::jobs::{import_job, import_parameters};
use clap::Args;
use std::path::PathBuf;
use tokio::sync::watch;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Delimited file to import (first line is a header)
    pub file: PathBuf,

    /// Override the configured chunk size
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

impl ImportArgs {
    /// Execute the import command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let file = match std::fs::canonicalize(&self.file) {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(file = %self.file.display(), error = %e, "Input file not found");
                eprintln!("❌ Cannot read input file {}: {e}", self.file.display());
                return Ok(EXIT_CONFIG);
            }
        };

        let (mut config, repositories) = match connect(config_path).await {
            Ok(connected) => connected,
            Err(code) => return Ok(code),
        };

        if let Some(chunk_size) = self.chunk_size {
            tracing::info!(chunk_size, "Overriding chunk size from CLI");
            config.batch.chunk_size = chunk_size;
        }

        let job = match import_job(repositories.products.clone(), &config.batch) {
            Ok(job) => job,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(error_exit_code(&e));
            }
        };

        tracing::info!(file = %file.display(), "Starting import");
        println!("🚀 Importing {}", file.display());

        let launcher = JobLauncher::new(repositories.jobs.clone()).with_shutdown(shutdown_signal);
        let execution = match launcher.run(&job, import_parameters(&file)).await {
            Ok(execution) => execution,
            Err(e) => {
                tracing::error!(error = %e, "Import was not run");
                eprintln!("❌ Import was not run: {e}");
                return Ok(error_exit_code(&e));
            }
        };

        if let Err(e) = print_summary(&mut std::io::stdout(), &execution) {
            tracing::warn!(error = %e, "Failed to print summary");
            return Ok(EXIT_FATAL);
        }

        match repositories.products.count().await {
            Ok(count) => println!("  Products in store: {count}"),
            Err(e) => tracing::warn!(error = %e, "Failed to count products"),
        }

        Ok(status_exit_code(execution.status))
    }
}
