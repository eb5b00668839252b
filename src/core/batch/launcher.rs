//! Job launcher: identity checks, execution bookkeeping and the run itself

use super::execution::JobExecution;
use super::job::Job;
use super::parameters::JobParameters;
use super::status::BatchStatus;
use super::step::StepRuntime;
use crate::adapters::database::traits::JobRepository;
use crate::domain::{FerryError, Result};
use std::sync::Arc;
use tokio::sync::watch;

/// Starts jobs and awaits their terminal status
///
/// # Examples
///
/// ```no_run
/// use ferry::adapters::memory::{InMemoryJobRepository, InMemoryProductRepository};
/// use ferry::core::batch::{JobLauncher, JobParameters};
/// use ferry::core::jobs::{import_job, INPUT_FILE_PARAMETER};
/// use ferry::config::BatchConfig;
/// use std::sync::Arc;
///
/// # async fn example() -> ferry::domain::Result<()> {
/// let products = Arc::new(InMemoryProductRepository::new());
/// let launcher = JobLauncher::new(Arc::new(InMemoryJobRepository::new()));
///
/// let job = import_job(products, &BatchConfig::default())?;
/// let parameters = JobParameters::builder()
///     .add_string(INPUT_FILE_PARAMETER, "/data/products.csv")
///     .build();
///
/// let execution = launcher.run(&job, parameters).await?;
/// println!("{}", execution.status);
/// # Ok(())
/// # }
/// ```
pub struct JobLauncher {
    repository: Arc<dyn JobRepository>,
    shutdown: watch::Receiver<bool>,
}

impl JobLauncher {
    /// Launcher that is never asked to stop
    pub fn new(repository: Arc<dyn JobRepository>) -> Self {
        let (_tx, shutdown) = watch::channel(false);
        Self {
            repository,
            shutdown,
        }
    }

    /// Stop running jobs between chunks once `shutdown` turns true
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// The job repository executions are saved to
    pub fn repository(&self) -> &Arc<dyn JobRepository> {
        &self.repository
    }

    /// Run `job` with `parameters` to a terminal status
    ///
    /// # Returns
    ///
    /// The finished execution. A `FAILED` or `STOPPED` execution is still
    /// `Ok`; callers decide how to report it.
    ///
    /// # Errors
    ///
    /// * `FerryError::Configuration` if a required parameter is missing;
    ///   nothing is created in that case
    /// * `FerryError::JobInstanceAlreadyComplete` if this instance already
    ///   completed
    /// * `FerryError::JobExecutionAlreadyRunning` if an execution of this
    ///   instance has not finished
    /// * `FerryError::JobRestart` if the instance failed before and the job
    ///   is not restartable
    /// * Store errors from the job repository
    pub async fn run(&self, job: &Job, parameters: JobParameters) -> Result<JobExecution> {
        job.validator().validate(&parameters)?;

        let instance_key = parameters.instance_key(job.name());
        let previous = self
            .repository
            .find_last_job_execution(job.name(), &instance_key)
            .await?;

        if let Some(last) = &previous {
            match last.status {
                BatchStatus::Completed => {
                    return Err(FerryError::JobInstanceAlreadyComplete(format!(
                        "job '{}' already completed for parameters {} (execution {})",
                        job.name(),
                        parameters,
                        last.id
                    )));
                }
                status if !status.is_terminal() => {
                    return Err(FerryError::JobExecutionAlreadyRunning(format!(
                        "job '{}' execution {} is {}",
                        job.name(),
                        last.id,
                        status
                    )));
                }
                status if !status.is_restartable() || !job.is_restartable() => {
                    return Err(FerryError::JobRestart(format!(
                        "job '{}' cannot restart execution {} which ended {}",
                        job.name(),
                        last.id,
                        status
                    )));
                }
                _ => {
                    tracing::info!(
                        job = %job.name(),
                        instance = %instance_key.short(),
                        previous_execution = %last.id,
                        previous_status = %last.status,
                        "Restarting job instance"
                    );
                }
            }
        }

        let mut execution = JobExecution::new(job.name(), parameters);
        if let Some(last) = &previous {
            execution.execution_context = last.execution_context.clone();
        }
        self.repository.save_job_execution(&execution).await?;

        tracing::debug!(
            job = %job.name(),
            execution_id = %execution.id,
            instance = %execution.instance_key.short(),
            parameters = %execution.parameters,
            "Created job execution"
        );

        let runtime = StepRuntime::new(Arc::clone(&self.repository), self.shutdown.clone());

        if let Err(e) = job.execute(&mut execution, previous.as_ref(), &runtime).await {
            tracing::error!(
                job = %job.name(),
                execution_id = %execution.id,
                error = %e,
                "Job execution aborted"
            );
            execution.add_failure(e.to_string());
            if !execution.status.is_terminal() {
                execution.transition(BatchStatus::Failed)?;
            }
        }

        self.repository.save_job_execution(&execution).await?;
        Ok(execution)
    }
}
