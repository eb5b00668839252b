//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output for interactive runs
//! - JSON-formatted log files with rotation
//! - Configurable log levels, overridable through `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use ferry::logging::init_logging;
//! use ferry::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a job execution
///
/// # Example
///
/// ```no_run
/// use ferry::log_job_start;
/// use ferry::domain::JobExecutionId;
///
/// let id = JobExecutionId::generate();
/// log_job_start!("Products-Import-Job", &id);
/// ```
#[macro_export]
macro_rules! log_job_start {
    ($job_name:expr, $execution_id:expr) => {
        tracing::info!(
            job = %$job_name,
            execution_id = %$execution_id,
            "Starting job"
        );
    };
}

/// Log the terminal status of a job execution
///
/// # Example
///
/// ```no_run
/// use ferry::log_job_complete;
/// use std::time::Duration;
///
/// log_job_complete!("Products-Export-Job", "COMPLETED", 42u64, Duration::from_millis(350));
/// ```
#[macro_export]
macro_rules! log_job_complete {
    ($job_name:expr, $status:expr, $write_count:expr, $duration:expr) => {
        tracing::info!(
            job = %$job_name,
            status = %$status,
            write_count = $write_count,
            duration_ms = $duration.as_millis() as u64,
            "Job finished"
        );
    };
}

/// Log a committed chunk
///
/// # Example
///
/// ```no_run
/// use ferry::log_chunk_committed;
///
/// log_chunk_committed!("Products-Import-Step", 3usize, 100usize, 300u64);
/// ```
#[macro_export]
macro_rules! log_chunk_committed {
    ($step:expr, $chunk:expr, $size:expr, $total:expr) => {
        tracing::debug!(
            step = %$step,
            chunk = $chunk,
            size = $size,
            total = $total,
            "Chunk committed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use ferry::log_error_with_context;
/// use ferry::domain::FerryError;
///
/// let error = FerryError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        let id = crate::domain::JobExecutionId::generate();
        log_job_start!("job", &id);
        log_job_complete!("job", "COMPLETED", 3u64, Duration::from_millis(5));
        log_chunk_committed!("step", 1usize, 3usize, 3u64);
        let err = crate::domain::FerryError::Other("boom".to_string());
        log_error_with_context!(&err, "testing");
    }
}
