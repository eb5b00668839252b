// Ferry - Chunk-oriented product import/export
// Copyright (c) 2025 Ferry Contributors
// Licensed under the MIT License

//! # Ferry - Chunk-oriented product import/export
//!
//! Ferry moves product records (id, name, description, price, quantity)
//! between delimited text files and a persistent store with two batch jobs:
//! import (file to store) and export (store to file).
//!
//! ## Overview
//!
//! At its heart is a chunk-oriented batch engine that:
//! - **Reads** records from a source in bounded groups
//! - **Transforms** each record (identity by default)
//! - **Writes** each group to a sink and commits it as one unit
//! - **Tracks** job and step executions so failed or stopped runs can resume
//!
//! ## Architecture
//!
//! Ferry follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Batch engine and the import/export jobs
//! - [`adapters`] - Files, in-memory and PostgreSQL repositories
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ferry::adapters::database::create_repositories;
//! use ferry::config::load_config;
//! use ferry::core::batch::JobLauncher;
//! use ferry::core::jobs::{import_job, import_parameters};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("ferry.toml")?;
//!     let repositories = create_repositories(&config).await?;
//!
//!     let job = import_job(repositories.products.clone(), &config.batch)?;
//!     let launcher = JobLauncher::new(repositories.jobs.clone());
//!     let execution = launcher
//!         .run(&job, import_parameters(Path::new("/data/products.csv")))
//!         .await?;
//!
//!     println!("{}: {} products written", execution.status, execution.write_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Restart
//!
//! A job instance is identified by its name and identifying parameters. A
//! completed instance is never run twice. A failed or stopped one runs again
//! from where it left off: completed steps are skipped and the unfinished
//! step skips the records its previous execution already committed.
//!
//! ## Error Handling
//!
//! Ferry uses the [`domain::FerryError`] type for all errors:
//!
//! ```rust,no_run
//! use ferry::domain::FerryError;
//!
//! fn example() -> Result<(), FerryError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = ferry::config::load_config("ferry.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Ferry uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(job = "Products-Import-Job", "Starting import");
//! warn!(step = "Products-Import-Step", chunk = 3, "Chunk rolled back");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
