//! Jobs: ordered steps plus lifecycle hooks

use super::execution::JobExecution;
use super::parameters::JobParametersValidator;
use super::status::BatchStatus;
use super::step::{Step, StepRuntime};
use crate::domain::{FerryError, Result};
use crate::{log_job_complete, log_job_start};
use std::time::Instant;

/// Runs once before the first step; may populate the job context
pub type BeforeJobHook = Box<dyn Fn(&mut JobExecution) -> Result<()> + Send + Sync>;

/// Runs once after the job reached a terminal status
pub type AfterJobHook = Box<dyn Fn(&JobExecution) + Send + Sync>;

/// A named, ordered sequence of steps
pub struct Job {
    name: String,
    steps: Vec<Box<dyn Step>>,
    restartable: bool,
    validator: JobParametersValidator,
    before_job: Option<BeforeJobHook>,
    after_job: Option<AfterJobHook>,
}

impl Job {
    /// Start building a job
    pub fn builder(name: impl Into<String>) -> JobBuilder {
        JobBuilder {
            name: name.into(),
            steps: Vec::new(),
            restartable: true,
            validator: JobParametersValidator::default(),
            before_job: None,
            after_job: None,
        }
    }

    /// Job name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a failed or stopped instance may run again
    pub fn is_restartable(&self) -> bool {
        self.restartable
    }

    /// Parameter checks applied before launch
    pub fn validator(&self) -> &JobParametersValidator {
        &self.validator
    }

    /// Step names in execution order
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Run the job to a terminal status
    ///
    /// Steps run in order; the next step starts only if the previous one
    /// completed. When `previous` is a failed or stopped run of the same
    /// instance, steps it completed are not run again.
    ///
    /// Step failures do not surface as `Err`: they leave the execution
    /// `FAILED` with the error recorded in `failures`.
    ///
    /// # Errors
    ///
    /// Returns an error only for illegal state transitions.
    pub async fn execute(
        &self,
        execution: &mut JobExecution,
        previous: Option<&JobExecution>,
        runtime: &StepRuntime,
    ) -> Result<()> {
        log_job_start!(self.name, execution.id);
        let started = Instant::now();

        execution.transition(BatchStatus::Started)?;
        if let Err(e) = runtime.repository.save_job_execution(execution).await {
            tracing::warn!(job = %self.name, error = %e, "Failed to save started job execution");
        }

        let final_status = match self.before(execution) {
            Ok(()) => self.run_steps(execution, previous, runtime).await,
            Err(e) => {
                tracing::error!(job = %self.name, error = %e, "before_job hook failed");
                execution.add_failure(e.to_string());
                BatchStatus::Failed
            }
        };

        execution.transition(final_status)?;

        if let Some(hook) = &self.after_job {
            hook(execution);
        }

        log_job_complete!(
            self.name,
            execution.status,
            execution.write_count(),
            started.elapsed()
        );

        Ok(())
    }

    fn before(&self, execution: &mut JobExecution) -> Result<()> {
        match &self.before_job {
            Some(hook) => hook(execution),
            None => Ok(()),
        }
    }

    async fn run_steps(
        &self,
        execution: &mut JobExecution,
        previous: Option<&JobExecution>,
        runtime: &StepRuntime,
    ) -> BatchStatus {
        for step in &self.steps {
            let previous_step = previous.and_then(|p| p.step_execution(step.name()));

            if previous_step.is_some_and(|s| s.status == BatchStatus::Completed) {
                tracing::info!(
                    job = %self.name,
                    step = %step.name(),
                    "Step completed in a previous run, skipping"
                );
                continue;
            }

            if let Err(e) = step.execute(execution, previous_step, runtime).await {
                execution.add_failure(e.to_string());
                return BatchStatus::Failed;
            }

            let status = execution
                .step_execution(step.name())
                .map(|s| s.status)
                .unwrap_or(BatchStatus::Failed);

            if status != BatchStatus::Completed {
                return status;
            }
        }

        BatchStatus::Completed
    }
}

/// Builder for [`Job`]
pub struct JobBuilder {
    name: String,
    steps: Vec<Box<dyn Step>>,
    restartable: bool,
    validator: JobParametersValidator,
    before_job: Option<BeforeJobHook>,
    after_job: Option<AfterJobHook>,
}

impl JobBuilder {
    /// Append a step
    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Whether a failed or stopped instance may run again (default true)
    pub fn restartable(mut self, restartable: bool) -> Self {
        self.restartable = restartable;
        self
    }

    /// Parameter checks applied by the launcher
    pub fn validator(mut self, validator: JobParametersValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Hook run before the first step
    pub fn before_job<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut JobExecution) -> Result<()> + Send + Sync + 'static,
    {
        self.before_job = Some(Box::new(hook));
        self
    }

    /// Hook run after the job finished
    pub fn after_job<F>(mut self, hook: F) -> Self
    where
        F: Fn(&JobExecution) + Send + Sync + 'static,
    {
        self.after_job = Some(Box::new(hook));
        self
    }

    /// Build the job
    ///
    /// # Errors
    ///
    /// Returns `FerryError::Configuration` if no step was added.
    pub fn build(self) -> Result<Job> {
        if self.steps.is_empty() {
            return Err(FerryError::Configuration(format!(
                "job '{}' has no steps",
                self.name
            )));
        }

        Ok(Job {
            name: self.name,
            steps: self.steps,
            restartable: self.restartable,
            validator: self.validator,
            before_job: self.before_job,
            after_job: self.after_job,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryJobRepository;
    use crate::core::batch::item::{ItemReader, ItemWriter};
    use crate::core::batch::parameters::JobParameters;
    use crate::core::batch::step::ChunkStep;
    use crate::core::batch::testing::{SharedWriter, VecReader};
    use std::sync::{Arc, Mutex};
    use tokio::sync::watch;

    fn runtime() -> StepRuntime {
        let (_tx, rx) = watch::channel(false);
        StepRuntime::new(Arc::new(InMemoryJobRepository::new()), rx)
    }

    fn step(name: &str, items: Vec<i32>, sink: SharedWriter<i32>) -> ChunkStep<i32> {
        ChunkStep::<i32>::builder(name)
            .chunk_size(10)
            .reader(move |_| Ok(Box::new(VecReader::new(items.clone())) as Box<dyn ItemReader<i32>>))
            .writer(move |_| Ok(Box::new(sink.clone()) as Box<dyn ItemWriter<i32>>))
            .build()
            .unwrap()
    }

    #[test]
    fn test_job_without_steps_rejected() {
        let err = Job::builder("empty").build().err().unwrap();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_hooks_run_around_steps() {
        let events = Arc::new(Mutex::new(Vec::<String>::new()));
        let before_events = Arc::clone(&events);
        let after_events = Arc::clone(&events);
        let sink = SharedWriter::default();

        let job = Job::builder("job")
            .step(step("step", vec![1, 2], sink.clone()))
            .before_job(move |execution| {
                before_events.lock().unwrap().push("before".to_string());
                execution.execution_context.put_string("seen", "yes");
                Ok(())
            })
            .after_job(move |execution| {
                after_events
                    .lock()
                    .unwrap()
                    .push(format!("after:{}", execution.status));
            })
            .build()
            .unwrap();

        let mut execution = JobExecution::new("job", JobParameters::empty());
        job.execute(&mut execution, None, &runtime()).await.unwrap();

        assert_eq!(execution.status, BatchStatus::Completed);
        assert_eq!(execution.execution_context.get_string("seen"), Some("yes"));
        assert_eq!(
            *events.lock().unwrap(),
            vec!["before".to_string(), "after:COMPLETED".to_string()]
        );
        assert_eq!(sink.items().await, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_before_job_failure_skips_steps() {
        let sink = SharedWriter::default();
        let job = Job::builder("job")
            .step(step("step", vec![1], sink.clone()))
            .before_job(|_| Err(FerryError::Configuration("no input".to_string())))
            .build()
            .unwrap();

        let mut execution = JobExecution::new("job", JobParameters::empty());
        job.execute(&mut execution, None, &runtime()).await.unwrap();

        assert_eq!(execution.status, BatchStatus::Failed);
        assert!(execution.step_executions.is_empty());
        assert!(execution.failures[0].contains("no input"));
        assert!(sink.items().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_step_stops_sequencing() {
        let second_sink = SharedWriter::default();
        let failing = ChunkStep::<i32>::builder("first")
            .reader(|_| Err(FerryError::Io("missing".to_string())))
            .writer(|_| Ok(Box::new(SharedWriter::<i32>::default()) as Box<dyn ItemWriter<i32>>))
            .build()
            .unwrap();

        let job = Job::builder("job")
            .step(failing)
            .step(step("second", vec![1], second_sink.clone()))
            .build()
            .unwrap();

        let mut execution = JobExecution::new("job", JobParameters::empty());
        job.execute(&mut execution, None, &runtime()).await.unwrap();

        assert_eq!(execution.status, BatchStatus::Failed);
        assert_eq!(execution.step_executions.len(), 1);
        assert_eq!(execution.failures.len(), 1);
        assert!(second_sink.items().await.is_empty());
    }

    #[tokio::test]
    async fn test_restart_skips_completed_steps() {
        let first_sink = SharedWriter::default();
        let second_sink = SharedWriter::default();
        let job = Job::builder("job")
            .step(step("first", vec![1], first_sink.clone()))
            .step(step("second", vec![2], second_sink.clone()))
            .build()
            .unwrap();

        let mut previous = JobExecution::new("job", JobParameters::empty());
        let mut done = crate::core::batch::execution::StepExecution::new("first");
        done.transition(BatchStatus::Started).unwrap();
        done.transition(BatchStatus::Completed).unwrap();
        previous.step_executions.push(done);

        let mut execution = JobExecution::new("job", JobParameters::empty());
        job.execute(&mut execution, Some(&previous), &runtime())
            .await
            .unwrap();

        assert_eq!(execution.status, BatchStatus::Completed);
        assert!(first_sink.items().await.is_empty());
        assert_eq!(second_sink.items().await, vec![2]);
    }
}
