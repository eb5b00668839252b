//! Chunk-oriented batch engine
//!
//! A [`Job`] is an ordered list of [`Step`]s. A [`ChunkStep`] pulls records
//! from an [`ItemReader`], transforms them with an [`ItemProcessor`] and
//! hands groups of `chunk_size` records to an [`ItemWriter`], which persists
//! each group atomically. The [`JobLauncher`] resolves job instance identity
//! against the job repository and drives the run to a terminal
//! [`BatchStatus`].

pub mod chunk;
pub mod context;
pub mod execution;
pub mod item;
pub mod job;
pub mod launcher;
pub mod parameters;
pub mod status;
pub mod step;

#[cfg(test)]
pub(crate) mod testing;

pub use chunk::{ChunkExecutor, ChunkOutcome};
pub use context::ExecutionContext;
pub use execution::{JobExecution, StepExecution, READ_COUNT_KEY};
pub use item::{FnProcessor, ItemProcessor, ItemReader, ItemWriter, PassThroughProcessor};
pub use job::{Job, JobBuilder};
pub use launcher::JobLauncher;
pub use parameters::{JobParameter, JobParameters, JobParametersBuilder, JobParametersValidator};
pub use status::BatchStatus;
pub use step::{ChunkStep, ChunkStepBuilder, Step, StepRuntime};
