//! Core business logic for Ferry.
//!
//! # Modules
//!
//! - [`batch`] - Chunk-oriented batch engine (readers, writers, steps, jobs, launcher)
//! - [`jobs`] - The product import and export jobs built on that engine
//!
//! # Job Workflow
//!
//! 1. **Validate**: Check the required job parameters
//! 2. **Resolve identity**: Derive the job instance key and refuse duplicates
//! 3. **Run steps**: Read, transform and write records one chunk at a time
//! 4. **Checkpoint**: Save step progress after every committed chunk
//! 5. **Report**: Return the terminal `JobExecution`
//!
//! # Example
//!
//! ```rust,no_run
//! use ferry::adapters::memory::{InMemoryJobRepository, InMemoryProductRepository};
//! use ferry::config::BatchConfig;
//! use ferry::core::batch::JobLauncher;
//! use ferry::core::jobs::{export_job, export_parameters};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let products = Arc::new(InMemoryProductRepository::new());
//!
//! // Create shutdown signal
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let launcher = JobLauncher::new(Arc::new(InMemoryJobRepository::new()))
//!     .with_shutdown(shutdown_rx);
//!
//! let job = export_job(products, "products.csv", &BatchConfig::default())?;
//! let execution = launcher.run(&job, export_parameters()).await?;
//!
//! println!("Status: {}", execution.status);
//! println!("Written: {}", execution.write_count());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod jobs;
