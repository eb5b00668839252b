//! The product jobs
//!
//! - [`import_job`] - Delimited file into the product repository
//! - [`export_job`] - Product repository into a delimited file
//!
//! Both are single-step chunk jobs with an identity transform.

pub mod export;
pub mod import;

pub use export::{
    export_job, export_parameters, EXPORT_JOB_NAME, EXPORT_STEP_NAME, RUN_ID_PARAMETER,
    TIME_PARAMETER,
};
pub use import::{
    import_job, import_parameters, IMPORT_JOB_NAME, IMPORT_STEP_NAME, INPUT_FILE_PARAMETER,
};
