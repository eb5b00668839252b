//! Chunk-oriented processing loop
//!
//! Reads up to `chunk_size` records, transforms them in read order and hands
//! the whole group to the writer as one atomic unit. Counters and restart
//! bookkeeping advance only after the writer returns successfully.

use super::execution::{JobExecution, READ_COUNT_KEY};
use super::item::{ItemProcessor, ItemReader, ItemWriter};
use super::step::StepRuntime;
use crate::domain::{FerryError, Result};
use crate::log_chunk_committed;

/// How a chunk loop ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The reader ran out of records
    Exhausted,
    /// A stop was requested between two chunks
    Stopped,
}

/// Drives reader, processor and writer one chunk at a time
#[derive(Debug, Clone, Copy)]
pub struct ChunkExecutor {
    chunk_size: usize,
}

impl ChunkExecutor {
    /// Create an executor committing every `chunk_size` records
    ///
    /// # Errors
    ///
    /// Returns `FerryError::Configuration` if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(FerryError::Configuration(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }

    /// Records per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Run chunks until the reader is exhausted, a stop is requested or a
    /// chunk fails
    ///
    /// A stop is honoured between chunks only when records remain; a stop
    /// that arrives after the last record was committed ends the run as
    /// exhausted.
    ///
    /// The step at `step_index` of `job_execution` is updated after every
    /// commit and the whole execution is saved through the job repository.
    ///
    /// # Arguments
    ///
    /// * `reader` - Opened record source
    /// * `processor` - Per-record transform
    /// * `writer` - Opened record sink
    /// * `job_execution` - Execution owning the step being run
    /// * `step_index` - Position of the step execution to update
    /// * `runtime` - Job repository and shutdown signal
    ///
    /// # Errors
    ///
    /// Returns `FerryError::ChunkProcessing` naming the step and chunk when
    /// reading, processing or writing fails. The failed chunk is counted as a
    /// rollback; earlier chunks stay committed.
    pub async fn run<T>(
        &self,
        reader: &mut dyn ItemReader<T>,
        processor: &dyn ItemProcessor<T>,
        writer: &mut dyn ItemWriter<T>,
        job_execution: &mut JobExecution,
        step_index: usize,
        runtime: &StepRuntime,
    ) -> Result<ChunkOutcome>
    where
        T: Send + Sync,
    {
        let step_name = job_execution.step_executions[step_index].step_name.clone();
        let mut chunk_number = 0usize;

        loop {
            if runtime.stop_requested() {
                // A record read here is never committed, so a restart reads it again
                let remaining = match reader.read().await {
                    Ok(item) => item.is_some(),
                    Err(e) => {
                        return Err(self.roll_back(job_execution, step_index, chunk_number + 1, &e));
                    }
                };

                if !remaining {
                    tracing::debug!(
                        step = %step_name,
                        "Stop requested after the last record was committed"
                    );
                    return Ok(ChunkOutcome::Exhausted);
                }

                tracing::warn!(
                    step = %step_name,
                    chunks_committed = chunk_number,
                    "Stop requested, leaving step before next chunk"
                );
                return Ok(ChunkOutcome::Stopped);
            }

            chunk_number += 1;

            let (items, exhausted) = match self.next_chunk(reader, processor).await {
                Ok(chunk) => chunk,
                Err(e) => {
                    return Err(self.roll_back(job_execution, step_index, chunk_number, &e));
                }
            };

            if items.is_empty() {
                return Ok(ChunkOutcome::Exhausted);
            }

            if let Err(e) = writer.write(&items).await {
                return Err(self.roll_back(job_execution, step_index, chunk_number, &e));
            }

            let committed = items.len() as u64;
            let step = &mut job_execution.step_executions[step_index];
            step.record_commit(committed);
            let total = step
                .execution_context
                .get_u64(READ_COUNT_KEY)
                .unwrap_or(0)
                + committed;
            step.execution_context.put_u64(READ_COUNT_KEY, total);

            log_chunk_committed!(step_name, chunk_number, items.len(), total);

            runtime
                .repository
                .save_job_execution(job_execution)
                .await
                .map_err(|e| FerryError::chunk(&step_name, chunk_number, &e))?;

            if exhausted {
                return Ok(ChunkOutcome::Exhausted);
            }
        }
    }

    /// Pull up to `chunk_size` records, then transform them in read order
    async fn next_chunk<T>(
        &self,
        reader: &mut dyn ItemReader<T>,
        processor: &dyn ItemProcessor<T>,
    ) -> Result<(Vec<T>, bool)>
    where
        T: Send + Sync,
    {
        let mut raw = Vec::with_capacity(self.chunk_size);
        let mut exhausted = false;

        while raw.len() < self.chunk_size {
            match reader.read().await? {
                Some(item) => raw.push(item),
                None => {
                    exhausted = true;
                    break;
                }
            }
        }

        let mut items = Vec::with_capacity(raw.len());
        for item in raw {
            items.push(processor.process(item).await?);
        }

        Ok((items, exhausted))
    }

    fn roll_back(
        &self,
        job_execution: &mut JobExecution,
        step_index: usize,
        chunk_number: usize,
        source: &FerryError,
    ) -> FerryError {
        let step = &mut job_execution.step_executions[step_index];
        step.rollback_count += 1;

        tracing::error!(
            step = %step.step_name,
            chunk = chunk_number,
            committed = step.write_count,
            error = %source,
            "Chunk rolled back"
        );

        FerryError::chunk(step.step_name.clone(), chunk_number, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryJobRepository;
    use crate::core::batch::execution::StepExecution;
    use crate::core::batch::item::{FnProcessor, PassThroughProcessor};
    use crate::core::batch::parameters::JobParameters;
    use crate::core::batch::status::BatchStatus;
    use crate::core::batch::testing::{FailingWriter, RecordingWriter, VecReader};
    use std::sync::Arc;
    use tokio::sync::watch;

    fn started_job() -> JobExecution {
        let mut job = JobExecution::new("job", JobParameters::empty());
        let mut step = StepExecution::new("step");
        step.transition(BatchStatus::Started).unwrap();
        job.step_executions.push(step);
        job
    }

    fn runtime() -> (StepRuntime, Arc<InMemoryJobRepository>, watch::Sender<bool>) {
        let repository = Arc::new(InMemoryJobRepository::new());
        let (tx, rx) = watch::channel(false);
        (StepRuntime::new(repository.clone(), rx), repository, tx)
    }

    async fn drive(
        chunk_size: usize,
        reader: &mut dyn ItemReader<i32>,
        processor: &dyn ItemProcessor<i32>,
        writer: &mut dyn ItemWriter<i32>,
        job: &mut JobExecution,
        runtime: &StepRuntime,
    ) -> Result<ChunkOutcome> {
        ChunkExecutor::new(chunk_size)?
            .run(reader, processor, writer, job, 0, runtime)
            .await
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = ChunkExecutor::new(0).unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_commits_in_chunks() {
        let (runtime, repository, _tx) = runtime();
        let mut job = started_job();
        let mut reader = VecReader::new((1..=5).collect());
        let mut writer = RecordingWriter::default();

        let outcome = drive(
            2,
            &mut reader,
            &PassThroughProcessor,
            &mut writer,
            &mut job,
            &runtime,
        )
        .await
        .unwrap();

        assert_eq!(outcome, ChunkOutcome::Exhausted);
        assert_eq!(writer.chunks, vec![vec![1, 2], vec![3, 4], vec![5]]);

        let step = &job.step_executions[0];
        assert_eq!(step.read_count, 5);
        assert_eq!(step.write_count, 5);
        assert_eq!(step.commit_count, 3);
        assert_eq!(step.rollback_count, 0);
        assert_eq!(step.execution_context.get_u64(READ_COUNT_KEY), Some(5));

        let saved = repository.get(&job.id).await.unwrap();
        assert_eq!(saved.step_executions[0].commit_count, 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_ends_with_empty_read() {
        let (runtime, _repository, _tx) = runtime();
        let mut job = started_job();
        let mut reader = VecReader::new(vec![1, 2, 3, 4]);
        let mut writer = RecordingWriter::default();

        drive(
            2,
            &mut reader,
            &PassThroughProcessor,
            &mut writer,
            &mut job,
            &runtime,
        )
        .await
        .unwrap();

        assert_eq!(writer.chunks.len(), 2);
        assert_eq!(job.step_executions[0].commit_count, 2);
    }

    #[tokio::test]
    async fn test_empty_source_commits_nothing() {
        let (runtime, _repository, _tx) = runtime();
        let mut job = started_job();
        let mut reader = VecReader::new(Vec::new());
        let mut writer = RecordingWriter::default();

        let outcome = drive(
            10,
            &mut reader,
            &PassThroughProcessor,
            &mut writer,
            &mut job,
            &runtime,
        )
        .await
        .unwrap();

        assert_eq!(outcome, ChunkOutcome::Exhausted);
        assert!(writer.chunks.is_empty());
        assert_eq!(job.step_executions[0].commit_count, 0);
    }

    #[tokio::test]
    async fn test_writer_failure_rolls_back_chunk() {
        let (runtime, _repository, _tx) = runtime();
        let mut job = started_job();
        let mut reader = VecReader::new((1..=6).collect());
        let mut writer = FailingWriter::failing_on_call(2);

        let err = drive(
            2,
            &mut reader,
            &PassThroughProcessor,
            &mut writer,
            &mut job,
            &runtime,
        )
        .await
        .unwrap_err();

        match err {
            FerryError::ChunkProcessing { step, chunk, .. } => {
                assert_eq!(step, "step");
                assert_eq!(chunk, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(writer.committed, vec![vec![1, 2]]);

        let step = &job.step_executions[0];
        assert_eq!(step.write_count, 2);
        assert_eq!(step.commit_count, 1);
        assert_eq!(step.rollback_count, 1);
    }

    #[tokio::test]
    async fn test_processor_failure_aborts_chunk() {
        let (runtime, _repository, _tx) = runtime();
        let mut job = started_job();
        let mut reader = VecReader::new(vec![1, 2, 3]);
        let mut writer = RecordingWriter::default();
        let processor = FnProcessor::new(|n: i32| {
            if n == 3 {
                Err(FerryError::Validation("three".to_string()))
            } else {
                Ok(n * 10)
            }
        });

        let err = drive(2, &mut reader, &processor, &mut writer, &mut job, &runtime)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("three"));
        assert_eq!(writer.chunks, vec![vec![10, 20]]);
    }

    #[tokio::test]
    async fn test_stop_checked_between_chunks() {
        let (runtime, _repository, tx) = runtime();
        let mut job = started_job();
        tx.send(true).unwrap();

        let mut reader = VecReader::new(vec![1, 2, 3]);
        let mut writer = RecordingWriter::default();
        let outcome = drive(
            2,
            &mut reader,
            &PassThroughProcessor,
            &mut writer,
            &mut job,
            &runtime,
        )
        .await
        .unwrap();

        assert_eq!(outcome, ChunkOutcome::Stopped);
        assert!(writer.chunks.is_empty());
    }

    /// Writer that requests a stop once it has committed a chunk
    struct StopAfterWrite {
        stop: watch::Sender<bool>,
        chunks: Vec<Vec<i32>>,
    }

    #[async_trait::async_trait]
    impl ItemWriter<i32> for StopAfterWrite {
        async fn write(&mut self, chunk: &[i32]) -> Result<()> {
            self.chunks.push(chunk.to_vec());
            self.stop.send_replace(true);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_stop_after_last_full_chunk_counts_as_exhausted() {
        let (runtime, _repository, tx) = runtime();
        let mut job = started_job();

        let mut reader = VecReader::new(vec![1, 2]);
        let mut writer = StopAfterWrite {
            stop: tx,
            chunks: Vec::new(),
        };
        let outcome = drive(
            2,
            &mut reader,
            &PassThroughProcessor,
            &mut writer,
            &mut job,
            &runtime,
        )
        .await
        .unwrap();

        assert_eq!(outcome, ChunkOutcome::Exhausted);
        assert_eq!(writer.chunks, vec![vec![1, 2]]);
        assert_eq!(job.step_executions[0].commit_count, 1);
    }

    #[tokio::test]
    async fn test_stop_with_records_left_leaves_them_uncommitted() {
        let (runtime, _repository, tx) = runtime();
        let mut job = started_job();

        let mut reader = VecReader::new(vec![1, 2, 3]);
        let mut writer = StopAfterWrite {
            stop: tx,
            chunks: Vec::new(),
        };
        let outcome = drive(
            2,
            &mut reader,
            &PassThroughProcessor,
            &mut writer,
            &mut job,
            &runtime,
        )
        .await
        .unwrap();

        assert_eq!(outcome, ChunkOutcome::Stopped);
        assert_eq!(writer.chunks, vec![vec![1, 2]]);
        assert_eq!(job.step_executions[0].write_count, 2);
    }
}
