//! Repository abstraction traits
//!
//! This module defines the traits that persistence backends must implement
//! to work with Ferry: one for the product records jobs move, one for the
//! job execution records the launcher keeps.

use crate::core::batch::execution::JobExecution;
use crate::domain::ids::JobInstanceKey;
use crate::domain::product::Product;
use crate::domain::Result;
use async_trait::async_trait;

/// Product store
///
/// This trait defines the interface that all product backends must implement.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create the tables the repository needs, if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    async fn ensure_schema(&self) -> Result<()>;

    /// Insert or update a group of products in one transaction
    ///
    /// Products without an id are inserted and receive one; products with an
    /// id are updated in place. An id that is not stored is rejected rather
    /// than inserted, since ids are only ever assigned by the store. Either
    /// every product is stored or none is.
    ///
    /// # Arguments
    ///
    /// * `products` - Products in the order they should be written
    ///
    /// # Returns
    ///
    /// Returns the stored products, each carrying its id, in input order.
    ///
    /// # Errors
    ///
    /// Returns `FerryError::Validation` if any product breaks a store
    /// invariant or carries an id that is not stored, or a store error if the
    /// transaction fails. Nothing is persisted in any of these cases.
    async fn save_all(&self, products: &[Product]) -> Result<Vec<Product>>;

    /// One page of products ordered by id ascending
    ///
    /// # Arguments
    ///
    /// * `page` - Zero-based page number
    /// * `size` - Page size
    async fn find_page(&self, page: usize, size: usize) -> Result<Vec<Product>>;

    /// Number of stored products
    async fn count(&self) -> Result<u64>;
}

/// Job execution store
///
/// Keeps every [`JobExecution`] so the launcher can resolve job instance
/// identity and restarts across runs.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert or replace an execution record, keyed by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    async fn save_job_execution(&self, execution: &JobExecution) -> Result<()>;

    /// Most recently created execution of a job instance
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the instance has never run.
    async fn find_last_job_execution(
        &self,
        job_name: &str,
        instance_key: &JobInstanceKey,
    ) -> Result<Option<JobExecution>>;

    /// Most recently created executions across all jobs, newest first
    async fn find_recent_job_executions(&self, limit: usize) -> Result<Vec<JobExecution>>;
}
