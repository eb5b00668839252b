//! Repository abstraction layer
//!
//! This module provides the trait-based abstraction over persistence
//! backends, the factory that picks one from configuration, and the item
//! reader/writer pair jobs use to page through and save products.

pub mod factory;
pub mod items;
pub mod traits;

pub use factory::{create_repositories, Repositories};
pub use items::{RepositoryItemReader, RepositoryItemWriter};
pub use traits::{JobRepository, ProductRepository};
