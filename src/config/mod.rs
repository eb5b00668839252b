//! Configuration management for Ferry.
//!
//! # Overview
//!
//! Ferry uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FERRY_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ferry::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ferry.toml")?;
//!
//! println!("Chunk size: {}", config.batch.chunk_size);
//! println!("Export path: {}", config.batch.export_path);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`BatchConfig`] - Chunk size, page size, export path and delimiter
//! - [`DatabaseTarget`] - `memory` or `postgresql`
//! - [`PostgreSQLConfig`] - Connection pool settings
//! - [`LoggingConfig`] - Local log files
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [application]
//! log_level = "info"
//!
//! [batch]
//! chunk_size = 100
//! page_size = 10
//! export_path = "products.csv"
//!
//! [postgresql]
//! connection_string = "${FERRY_DATABASE_URL}"
//! max_connections = 10
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default, parse_config};
pub use schema::{
    ApplicationConfig, BatchConfig, DatabaseTarget, FerryConfig, LoggingConfig, PostgreSQLConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
