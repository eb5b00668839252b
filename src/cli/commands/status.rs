//! Status command implementation
//!
//! This module implements the `status` command for listing recent job
//! executions from the job repository.

use super::{connect, EXIT_FATAL, EXIT_OK};
use crate::core::batch::JobExecution;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Number of executions to show
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,

    /// Only show executions of this job
    #[arg(long)]
    pub job: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking job status");

        println!("📊 Job Status");
        println!();

        let (_, repositories) = match connect(config_path).await {
            Ok(connected) => connected,
            Err(code) => return Ok(code),
        };

        let executions = match repositories.jobs.find_recent_job_executions(self.limit).await {
            Ok(executions) => executions,
            Err(e) => {
                println!("❌ Failed to load job executions");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        let filtered: Vec<&JobExecution> = executions
            .iter()
            .filter(|e| self.job.as_deref().map_or(true, |job| e.job_name == job))
            .collect();

        if filtered.is_empty() {
            println!("No job executions found.");
            println!("Run 'ferry import <FILE>' or 'ferry export' to start a job.");
            return Ok(EXIT_OK);
        }

        println!("Found {} execution(s):", filtered.len());
        println!();
        println!("{}", header());
        println!("{}", "-".repeat(118));
        for execution in filtered {
            println!("{}", row(execution));
        }

        Ok(EXIT_OK)
    }
}

fn header() -> String {
    format!(
        "{:<22} {:<38} {:<13} {:<10} {:>8} {:<25}",
        "Job", "Execution", "Instance", "Status", "Written", "Created"
    )
}

fn row(execution: &JobExecution) -> String {
    format!(
        "{:<22} {:<38} {:<13} {:<10} {:>8} {:<25}",
        execution.job_name,
        execution.id.to_string(),
        execution.instance_key.short(),
        execution.status.as_str(),
        execution.write_count(),
        execution.create_time.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
