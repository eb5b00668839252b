//! Export job: product repository into a delimited file

use crate::adapters::database::items::RepositoryItemReader;
use crate::adapters::database::traits::ProductRepository;
use crate::adapters::file::ProductFileWriter;
use crate::config::BatchConfig;
use crate::core::batch::{ChunkStep, ItemReader, ItemWriter, Job, JobParameters};
use crate::domain::{Product, Result};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Name of the export job
pub const EXPORT_JOB_NAME: &str = "Products-Export-Job";

/// Name of the export job's only step
pub const EXPORT_STEP_NAME: &str = "Products-Export-Step";

/// Job parameter holding the launch time in epoch milliseconds
pub const TIME_PARAMETER: &str = "time";

/// Job parameter holding a random id unique to one launch
pub const RUN_ID_PARAMETER: &str = "run.id";

/// Build the export job writing to `output`
///
/// The file is rewritten from scratch on every run, so the job is not
/// restartable: a failed export is simply launched again with fresh
/// parameters.
///
/// # Errors
///
/// Returns `FerryError::Configuration` if the batch settings are invalid.
pub fn export_job(
    products: Arc<dyn ProductRepository>,
    output: impl Into<PathBuf>,
    batch: &BatchConfig,
) -> Result<Job> {
    let output = output.into();
    let delimiter = batch.delimiter_byte();
    let page_size = batch.page_size;

    let step = ChunkStep::<Product>::builder(EXPORT_STEP_NAME)
        .chunk_size(batch.chunk_size)
        .reader(move |_| {
            let reader = RepositoryItemReader::new(Arc::clone(&products), page_size)?;
            Ok(Box::new(reader) as Box<dyn ItemReader<Product>>)
        })
        .writer(move |_| {
            let writer = ProductFileWriter::new(output.clone()).with_delimiter(delimiter);
            Ok(Box::new(writer) as Box<dyn ItemWriter<Product>>)
        })
        .build()?;

    Job::builder(EXPORT_JOB_NAME)
        .restartable(false)
        .step(step)
        .build()
}

/// Parameters for a new export instance
///
/// Carries the launch time and a random run id. Both are identifying, so
/// every launch is a distinct job instance even within one millisecond.
pub fn export_parameters() -> JobParameters {
    JobParameters::builder()
        .add_long(TIME_PARAMETER, Utc::now().timestamp_millis())
        .add_string(RUN_ID_PARAMETER, Uuid::new_v4().to_string())
        .build()
}
