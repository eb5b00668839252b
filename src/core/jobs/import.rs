//! Import job: delimited file into the product repository

use crate::adapters::database::items::RepositoryItemWriter;
use crate::adapters::database::traits::ProductRepository;
use crate::adapters::file::ProductFileReader;
use crate::config::BatchConfig;
use crate::core::batch::{
    ChunkStep, ItemReader, ItemWriter, Job, JobExecution, JobParameters, JobParametersValidator,
};
use crate::domain::{FerryError, Product, Result};
use std::path::Path;
use std::sync::Arc;

/// Name of the import job
pub const IMPORT_JOB_NAME: &str = "Products-Import-Job";

/// Name of the import job's only step
pub const IMPORT_STEP_NAME: &str = "Products-Import-Step";

/// Job parameter holding the absolute path of the file to import
pub const INPUT_FILE_PARAMETER: &str = "input.file.name";

/// Build the import job
///
/// The `before_job` hook copies the input file parameter into the job
/// context, and the step's reader factory picks it up from there.
///
/// # Errors
///
/// Returns `FerryError::Configuration` if the batch settings are invalid.
pub fn import_job(products: Arc<dyn ProductRepository>, batch: &BatchConfig) -> Result<Job> {
    let delimiter = batch.delimiter_byte();

    let step = ChunkStep::<Product>::builder(IMPORT_STEP_NAME)
        .chunk_size(batch.chunk_size)
        .reader(move |context| {
            let path = context.get_string(INPUT_FILE_PARAMETER).ok_or_else(|| {
                FerryError::Configuration(format!(
                    "'{INPUT_FILE_PARAMETER}' is not set in the job context"
                ))
            })?;
            let reader = ProductFileReader::new(path).with_delimiter(delimiter);
            Ok(Box::new(reader) as Box<dyn ItemReader<Product>>)
        })
        .writer(move |_| {
            let writer = RepositoryItemWriter::new(Arc::clone(&products));
            Ok(Box::new(writer) as Box<dyn ItemWriter<Product>>)
        })
        .build()?;

    Job::builder(IMPORT_JOB_NAME)
        .validator(JobParametersValidator::new([INPUT_FILE_PARAMETER]))
        .before_job(copy_input_file)
        .step(step)
        .build()
}

/// Parameters for importing `path`
///
/// The path is identifying: importing the same file twice is the same job
/// instance.
pub fn import_parameters(path: &Path) -> JobParameters {
    JobParameters::builder()
        .add_string(INPUT_FILE_PARAMETER, path.to_string_lossy())
        .build()
}

fn copy_input_file(execution: &mut JobExecution) -> Result<()> {
    let path = execution
        .parameters
        .get_string(INPUT_FILE_PARAMETER)
        .ok_or_else(|| {
            FerryError::Configuration(format!("Missing job parameter '{INPUT_FILE_PARAMETER}'"))
        })?
        .to_string();

    tracing::debug!(job = IMPORT_JOB_NAME, file = %path, "Resolved input file");
    execution
        .execution_context
        .put_string(INPUT_FILE_PARAMETER, path);
    Ok(())
}
