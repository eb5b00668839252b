//! External system integrations for Ferry.
//!
//! This module provides adapters between the batch engine and the outside
//! world:
//!
//! - [`database`] - Repository traits, factory and repository-backed items
//! - [`file`] - Delimited file reader and writer
//! - [`memory`] - In-memory repositories
//! - [`postgresql`] - PostgreSQL repositories
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with in-memory implementations. Jobs only see the
//! [`database::ProductRepository`] and [`database::JobRepository`] traits.
//!
//! ```rust,no_run
//! use ferry::adapters::database::create_repositories;
//! use ferry::config::FerryConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repositories = create_repositories(&FerryConfig::default()).await?;
//! println!("{} products stored", repositories.products.count().await?);
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod file;
pub mod memory;
pub mod postgresql;
