//! CLI command implementations
//!
//! This module contains all CLI command implementations and the exit code
//! mapping they share.

pub mod export;
pub mod import;
pub mod init;
pub mod status;
pub mod validate;

use crate::adapters::database::{create_repositories, Repositories};
use crate::config::{load_config_or_default, FerryConfig};
use crate::core::batch::{BatchStatus, JobExecution};
use crate::domain::{FerryError, StoreError};
use std::io::Write;

/// Job completed
pub const EXIT_OK: i32 = 0;
/// Job failed, or the launcher refused to run it
pub const EXIT_FAILED: i32 = 1;
/// Configuration or parameter problem
pub const EXIT_CONFIG: i32 = 2;
/// Store unreachable
pub const EXIT_CONNECTION: i32 = 4;
/// Anything else
pub const EXIT_FATAL: i32 = 5;
/// Job stopped on SIGINT/SIGTERM
pub const EXIT_STOPPED: i32 = 130;

/// Exit code for a finished execution
pub fn status_exit_code(status: BatchStatus) -> i32 {
    match status {
        BatchStatus::Completed => EXIT_OK,
        BatchStatus::Stopped => EXIT_STOPPED,
        BatchStatus::Failed => EXIT_FAILED,
        BatchStatus::Starting | BatchStatus::Started => EXIT_FATAL,
    }
}

/// Exit code for an error that kept a job from running
pub fn error_exit_code(err: &FerryError) -> i32 {
    match err {
        FerryError::Configuration(_) => EXIT_CONFIG,
        FerryError::Store(StoreError::ConnectionFailed(_)) => EXIT_CONNECTION,
        FerryError::JobInstanceAlreadyComplete(_)
        | FerryError::JobExecutionAlreadyRunning(_)
        | FerryError::JobRestart(_) => EXIT_FAILED,
        _ => EXIT_FATAL,
    }
}

/// Load the configuration and open the repositories it selects
///
/// Problems are reported on stderr and returned as an exit code.
pub(crate) async fn connect(config_path: &str) -> Result<(FerryConfig, Repositories), i32> {
    let config = match load_config_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            crate::log_error_with_context!(e, "Failed to load configuration");
            eprintln!("❌ Failed to load configuration: {e}");
            return Err(EXIT_CONFIG);
        }
    };

    match create_repositories(&config).await {
        Ok(repositories) => Ok((config, repositories)),
        Err(e) => {
            crate::log_error_with_context!(e, "Failed to open repositories");
            eprintln!("❌ Failed to connect to the store: {e}");
            Err(match e {
                FerryError::Configuration(_) => EXIT_CONFIG,
                FerryError::Store(_) => EXIT_CONNECTION,
                _ => EXIT_FATAL,
            })
        }
    }
}

/// Print the outcome of a job run
pub(crate) fn print_summary(out: &mut dyn Write, execution: &JobExecution) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "📊 {} Summary:", execution.job_name)?;
    writeln!(out, "  Execution: {}", execution.id)?;
    writeln!(out, "  Status: {}", execution.status)?;
    for step in &execution.step_executions {
        writeln!(
            out,
            "  Step {}: {} (read {}, written {}, commits {}, rollbacks {})",
            step.step_name,
            step.status,
            step.read_count,
            step.write_count,
            step.commit_count,
            step.rollback_count
        )?;
    }
    if let Some(duration) = execution.duration() {
        writeln!(
            out,
            "  Duration: {:.2}s",
            duration.num_milliseconds() as f64 / 1000.0
        )?;
    }

    if !execution.failures.is_empty() {
        writeln!(out)?;
        writeln!(out, "⚠️  Failures:")?;
        for failure in &execution.failures {
            writeln!(out, "  - {failure}")?;
        }
    }

    writeln!(out)?;
    match execution.status {
        BatchStatus::Completed => writeln!(out, "✅ Job completed successfully!"),
        BatchStatus::Stopped => {
            writeln!(out, "⚠️  Job stopped gracefully. Progress saved.")?;
            writeln!(out, "   Run the same command to resume from the last chunk.")
        }
        _ => writeln!(out, "❌ Job failed"),
    }
}
