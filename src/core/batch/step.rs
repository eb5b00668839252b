//! Steps: named units of work inside a job

use super::chunk::{ChunkExecutor, ChunkOutcome};
use super::context::ExecutionContext;
use super::execution::{JobExecution, StepExecution};
use super::item::{ItemProcessor, ItemReader, ItemWriter, PassThroughProcessor};
use super::status::BatchStatus;
use crate::adapters::database::traits::JobRepository;
use crate::domain::{FerryError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// Builds a reader for one step execution from the job context
pub type ReaderFactory<T> =
    Box<dyn Fn(&ExecutionContext) -> Result<Box<dyn ItemReader<T>>> + Send + Sync>;

/// Builds a writer for one step execution from the job context
pub type WriterFactory<T> =
    Box<dyn Fn(&ExecutionContext) -> Result<Box<dyn ItemWriter<T>>> + Send + Sync>;

/// Collaborators shared by every step of one job run
#[derive(Clone)]
pub struct StepRuntime {
    /// Where execution progress is saved
    pub repository: Arc<dyn JobRepository>,
    shutdown: watch::Receiver<bool>,
}

impl StepRuntime {
    /// Bundle a job repository with a shutdown signal
    pub fn new(repository: Arc<dyn JobRepository>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            repository,
            shutdown,
        }
    }

    /// Whether a graceful stop has been requested
    pub fn stop_requested(&self) -> bool {
        *self.shutdown.borrow()
    }
}

/// A named unit of work run by a [`Job`](super::job::Job)
#[async_trait]
pub trait Step: Send + Sync {
    /// Step name, unique within its job
    fn name(&self) -> &str;

    /// Run the step, appending its [`StepExecution`] to `job_execution`
    ///
    /// `previous` is this step's execution from the last failed or stopped
    /// run of the same job instance, if any.
    ///
    /// # Errors
    ///
    /// Returns the error that made the step fail. The appended step
    /// execution is already in a terminal status when this returns.
    async fn execute(
        &self,
        job_execution: &mut JobExecution,
        previous: Option<&StepExecution>,
        runtime: &StepRuntime,
    ) -> Result<()>;
}

/// Step that moves records from a reader to a writer in chunks
pub struct ChunkStep<T> {
    name: String,
    executor: ChunkExecutor,
    reader_factory: ReaderFactory<T>,
    processor: Arc<dyn ItemProcessor<T>>,
    writer_factory: WriterFactory<T>,
}

impl<T> ChunkStep<T>
where
    T: Send + Sync + 'static,
{
    /// Start building a chunk step
    pub fn builder(name: impl Into<String>) -> ChunkStepBuilder<T> {
        ChunkStepBuilder {
            name: name.into(),
            chunk_size: 100,
            reader_factory: None,
            processor: None,
            writer_factory: None,
        }
    }

    /// Records per chunk
    pub fn chunk_size(&self) -> usize {
        self.executor.chunk_size()
    }

    async fn run(
        &self,
        job_execution: &mut JobExecution,
        step_index: usize,
        skip: u64,
        runtime: &StepRuntime,
    ) -> Result<ChunkOutcome> {
        let context = job_execution.execution_context.clone();

        let mut reader = (self.reader_factory)(&context).map_err(|e| self.setup_error(e))?;
        let mut writer = (self.writer_factory)(&context).map_err(|e| self.setup_error(e))?;

        reader.open().await.map_err(|e| self.setup_error(e))?;
        if let Err(e) = writer.open().await {
            if let Err(close_err) = reader.close().await {
                tracing::warn!(step = %self.name, error = %close_err, "Failed to close reader");
            }
            return Err(self.setup_error(e));
        }

        let result = match skip_committed(reader.as_mut(), skip).await {
            Ok(()) => {
                self.executor
                    .run(
                        reader.as_mut(),
                        self.processor.as_ref(),
                        writer.as_mut(),
                        job_execution,
                        step_index,
                        runtime,
                    )
                    .await
            }
            Err(e) => Err(FerryError::chunk(&self.name, 0, &e)),
        };

        let reader_closed = reader.close().await;
        let writer_closed = writer.close().await;

        let outcome = result?;
        reader_closed?;
        writer_closed?;
        Ok(outcome)
    }

    /// Failures before the first chunk are configuration problems
    fn setup_error(&self, err: FerryError) -> FerryError {
        match err {
            FerryError::Configuration(_) => err,
            other => FerryError::Configuration(format!(
                "step '{}' could not be set up: {}",
                self.name, other
            )),
        }
    }
}

#[async_trait]
impl<T> Step for ChunkStep<T>
where
    T: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        job_execution: &mut JobExecution,
        previous: Option<&StepExecution>,
        runtime: &StepRuntime,
    ) -> Result<()> {
        let skip = previous.map(StepExecution::committed_total).unwrap_or(0);

        let mut step_execution = StepExecution::new(&self.name);
        if skip > 0 {
            step_execution
                .execution_context
                .put_u64(super::execution::READ_COUNT_KEY, skip);
            tracing::info!(
                step = %self.name,
                skip,
                "Resuming step after records committed by a previous run"
            );
        }
        step_execution.transition(BatchStatus::Started)?;
        job_execution.step_executions.push(step_execution);
        let step_index = job_execution.step_executions.len() - 1;

        runtime.repository.save_job_execution(job_execution).await?;

        tracing::info!(
            step = %self.name,
            chunk_size = self.executor.chunk_size(),
            "Executing step"
        );

        let result = self.run(job_execution, step_index, skip, runtime).await;

        let step = &mut job_execution.step_executions[step_index];
        let result = match result {
            Ok(ChunkOutcome::Exhausted) => {
                step.transition(BatchStatus::Completed)?;
                Ok(())
            }
            Ok(ChunkOutcome::Stopped) => {
                step.mark_stopped("Stopped between chunks on request")?;
                Ok(())
            }
            Err(e) => {
                step.mark_failed(e.to_string())?;
                Err(e)
            }
        };

        tracing::info!(
            step = %step.step_name,
            status = %step.status,
            read_count = step.read_count,
            write_count = step.write_count,
            commit_count = step.commit_count,
            rollback_count = step.rollback_count,
            "Step finished"
        );

        runtime.repository.save_job_execution(job_execution).await?;
        result
    }
}

/// Discard records a previous run already committed
async fn skip_committed<T: Send>(reader: &mut dyn ItemReader<T>, skip: u64) -> Result<()> {
    for _ in 0..skip {
        if reader.read().await?.is_none() {
            break;
        }
    }
    Ok(())
}

/// Builder for [`ChunkStep`]
pub struct ChunkStepBuilder<T> {
    name: String,
    chunk_size: usize,
    reader_factory: Option<ReaderFactory<T>>,
    processor: Option<Arc<dyn ItemProcessor<T>>>,
    writer_factory: Option<WriterFactory<T>>,
}

impl<T> ChunkStepBuilder<T>
where
    T: Send + Sync + 'static,
{
    /// Records per chunk (default 100)
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Reader factory, called once per step execution
    pub fn reader<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ExecutionContext) -> Result<Box<dyn ItemReader<T>>> + Send + Sync + 'static,
    {
        self.reader_factory = Some(Box::new(factory));
        self
    }

    /// Record transform (identity when not set)
    pub fn processor<P>(mut self, processor: P) -> Self
    where
        P: ItemProcessor<T> + 'static,
    {
        self.processor = Some(Arc::new(processor));
        self
    }

    /// Writer factory, called once per step execution
    pub fn writer<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ExecutionContext) -> Result<Box<dyn ItemWriter<T>>> + Send + Sync + 'static,
    {
        self.writer_factory = Some(Box::new(factory));
        self
    }

    /// Build the step
    ///
    /// # Errors
    ///
    /// Returns `FerryError::Configuration` when the reader or writer is
    /// missing, or the chunk size is zero.
    pub fn build(self) -> Result<ChunkStep<T>> {
        let executor = ChunkExecutor::new(self.chunk_size)?;
        let reader_factory = self.reader_factory.ok_or_else(|| {
            FerryError::Configuration(format!("step '{}' has no reader", self.name))
        })?;
        let writer_factory = self.writer_factory.ok_or_else(|| {
            FerryError::Configuration(format!("step '{}' has no writer", self.name))
        })?;
        let processor = self
            .processor
            .unwrap_or_else(|| Arc::new(PassThroughProcessor));

        Ok(ChunkStep {
            name: self.name,
            executor,
            reader_factory,
            processor,
            writer_factory,
        })
    }
}
