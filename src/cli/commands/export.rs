//! Export command implementation
//!
//! This module implements the `export` command, which writes every stored
//! product to a delimited file.

use super::{connect, error_exit_code, print_summary, status_exit_code, EXIT_FATAL};
use crate::core::batch::{BatchStatus, JobLauncher};
use crate::core::jobs::{export_job, export_parameters};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use uuid::Uuid;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (defaults to batch.export_path)
    #[arg(short, long, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Write the exported file to stdout and delete it afterwards
    #[arg(long)]
    pub stdout: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let (config, repositories) = match connect(config_path).await {
            Ok(connected) => connected,
            Err(code) => return Ok(code),
        };

        let output = self.output_path(&config.batch.export_path);

        let job = match export_job(repositories.products.clone(), &output, &config.batch) {
            Ok(job) => job,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(error_exit_code(&e));
            }
        };

        tracing::info!(output = %output.display(), "Starting export");
        eprintln!("🚀 Exporting to {}", output.display());

        let launcher = JobLauncher::new(repositories.jobs.clone()).with_shutdown(shutdown_signal);
        let execution = match launcher.run(&job, export_parameters()).await {
            Ok(execution) => execution,
            Err(e) => {
                tracing::error!(error = %e, "Export was not run");
                eprintln!("❌ Export was not run: {e}");
                return Ok(error_exit_code(&e));
            }
        };

        let printed = if self.stdout {
            print_summary(&mut std::io::stderr(), &execution)
        } else {
            print_summary(&mut std::io::stdout(), &execution)
        };
        if let Err(e) = printed {
            tracing::warn!(error = %e, "Failed to print summary");
        }

        if self.stdout {
            let streamed = if execution.status == BatchStatus::Completed {
                stream_to_stdout(&output).await
            } else {
                Ok(())
            };

            if let Err(e) = tokio::fs::remove_file(&output).await {
                tracing::warn!(output = %output.display(), error = %e, "Failed to delete export file");
            }

            if let Err(e) = streamed {
                tracing::error!(error = %e, "Failed to stream export");
                eprintln!("❌ Failed to stream export: {e}");
                return Ok(EXIT_FATAL);
            }
        }

        Ok(status_exit_code(execution.status))
    }

    fn output_path(&self, configured: &str) -> PathBuf {
        if self.stdout {
            return std::env::temp_dir().join(format!("ferry-export-{}.csv", Uuid::new_v4()));
        }

        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(configured))
    }
}

async fn stream_to_stdout(path: &Path) -> std::io::Result<()> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut stdout = tokio::io::stdout();
    tokio::io::copy(&mut file, &mut stdout).await?;
    stdout.flush().await?;
    tracing::debug!(path = %path.display(), "Streamed export to stdout");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_defaults_to_configured_path() {
        let args = ExportArgs {
            output: None,
            stdout: false,
        };
        assert_eq!(args.output_path("products.csv"), PathBuf::from("products.csv"));
    }

    #[test]
    fn test_output_override() {
        let args = ExportArgs {
            output: Some(PathBuf::from("/tmp/out.csv")),
            stdout: false,
        };
        assert_eq!(args.output_path("products.csv"), PathBuf::from("/tmp/out.csv"));
    }

    #[test]
    fn test_stdout_uses_temporary_file() {
        let args = ExportArgs {
            output: None,
            stdout: true,
        };
        let path = args.output_path("products.csv");
        assert!(path.starts_with(std::env::temp_dir()));
        assert_ne!(path, args.output_path("products.csv"));
    }
}
