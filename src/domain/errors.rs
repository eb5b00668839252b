//! Domain error types
//!
//! This module defines the error hierarchy for Ferry. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Ferry error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum FerryError {
    /// A required parameter or resource is missing before any chunk runs
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A reader, processor or writer failed while a chunk was in flight
    #[error("Chunk processing error in step '{step}' (chunk {chunk}): {message}")]
    ChunkProcessing {
        step: String,
        chunk: usize,
        message: String,
    },

    /// Persistence store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A malformed field in a delimited input line
    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// A record violates the store invariants
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal execution state transition
    #[error("State error: {0}")]
    State(String),

    /// The job instance identified by these parameters already completed
    #[error("Job instance already complete: {0}")]
    JobInstanceAlreadyComplete(String),

    /// An execution of this job instance has not reached a terminal status yet
    #[error("Job execution already running: {0}")]
    JobExecutionAlreadyRunning(String),

    /// The job cannot be restarted
    #[error("Job restart refused: {0}")]
    JobRestart(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl FerryError {
    /// Wrap an error raised while a chunk was being processed
    pub fn chunk(step: impl Into<String>, chunk: usize, source: &FerryError) -> Self {
        FerryError::ChunkProcessing {
            step: step.into(),
            chunk,
            message: source.to_string(),
        }
    }

    /// Whether this error happened before any chunk was processed
    pub fn is_configuration(&self) -> bool {
        matches!(self, FerryError::Configuration(_))
    }
}

/// Persistence store errors
///
/// Errors that occur when talking to a product or job repository backend.
/// These errors don't expose the database driver types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the store
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// Failed to initialize the schema
    #[error("Failed to initialize schema: {0}")]
    SchemaFailed(String),

    /// A query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction could not be started, committed or rolled back
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A stored row could not be mapped back into the domain
    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for FerryError {
    fn from(err: std::io::Error) -> Self {
        FerryError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for FerryError {
    fn from(err: serde_json::Error) -> Self {
        FerryError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for FerryError {
    fn from(err: toml::de::Error) -> Self {
        FerryError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ferry_error_display() {
        let err = FerryError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_chunk_error_wraps_source() {
        let source = FerryError::Validation("name cannot be empty".to_string());
        let err = FerryError::chunk("Products-Import-Step", 3, &source);

        assert!(matches!(err, FerryError::ChunkProcessing { chunk: 3, .. }));
        assert_eq!(
            err.to_string(),
            "Chunk processing error in step 'Products-Import-Step' (chunk 3): \
             Validation error: name cannot be empty"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::QueryFailed("relation missing".to_string());
        let err: FerryError = store_err.into();
        assert!(matches!(err, FerryError::Store(_)));
    }

    #[test]
    fn test_is_configuration() {
        assert!(FerryError::Configuration("x".to_string()).is_configuration());
        assert!(!FerryError::Io("x".to_string()).is_configuration());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: FerryError = io_err.into();
        assert!(matches!(err, FerryError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: FerryError = json_err.into();
        assert!(matches!(err, FerryError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: FerryError = toml_err.into();
        assert!(matches!(err, FerryError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
