//! In-memory repositories
//!
//! Process-local implementations of [`ProductRepository`] and
//! [`JobRepository`]. Nothing survives the process, so restarts only work
//! within one run of the program or in tests.

use crate::adapters::database::traits::{JobRepository, ProductRepository};
use crate::core::batch::execution::JobExecution;
use crate::domain::ids::{JobExecutionId, JobInstanceKey, ProductId};
use crate::domain::{FerryError, Product, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
struct ProductTable {
    rows: BTreeMap<ProductId, Product>,
    next_id: i64,
}

impl ProductTable {
    fn assign_id(&mut self) -> Result<ProductId> {
        self.next_id += 1;
        ProductId::new(self.next_id).map_err(FerryError::Other)
    }
}

/// Product store held in a `BTreeMap` keyed by id
///
/// Ids are assigned from 1 upwards. `save_all` works on a copy of the table
/// and swaps it in only when every product was accepted.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    table: RwLock<ProductTable>,
}

impl InMemoryProductRepository {
    /// Empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn save_all(&self, products: &[Product]) -> Result<Vec<Product>> {
        let mut table = self.table.write().await;
        let mut staged = table.clone();
        let mut saved = Vec::with_capacity(products.len());

        for product in products {
            product.validate()?;

            let id = match product.id {
                Some(id) if staged.rows.contains_key(&id) => id,
                Some(id) => {
                    return Err(FerryError::Validation(format!(
                        "product {id} does not exist"
                    )))
                }
                None => staged.assign_id()?,
            };

            let stored = product.clone().with_id(id);
            staged.rows.insert(id, stored.clone());
            saved.push(stored);
        }

        *table = staged;
        Ok(saved)
    }

    async fn find_page(&self, page: usize, size: usize) -> Result<Vec<Product>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .skip(page.saturating_mul(size))
            .take(size)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.table.read().await.rows.len() as u64)
    }
}

/// Job execution store kept in creation order
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    executions: RwLock<Vec<JobExecution>>,
}

impl InMemoryJobRepository {
    /// Empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest saved state of one execution
    pub async fn get(&self, id: &JobExecutionId) -> Option<JobExecution> {
        self.executions
            .read()
            .await
            .iter()
            .find(|execution| execution.id == *id)
            .cloned()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn save_job_execution(&self, execution: &JobExecution) -> Result<()> {
        let mut executions = self.executions.write().await;
        match executions.iter_mut().find(|e| e.id == execution.id) {
            Some(existing) => *existing = execution.clone(),
            None => executions.push(execution.clone()),
        }
        Ok(())
    }

    async fn find_last_job_execution(
        &self,
        job_name: &str,
        instance_key: &JobInstanceKey,
    ) -> Result<Option<JobExecution>> {
        let executions = self.executions.read().await;
        Ok(executions
            .iter()
            .rev()
            .find(|e| e.job_name == job_name && e.instance_key == *instance_key)
            .cloned())
    }

    async fn find_recent_job_executions(&self, limit: usize) -> Result<Vec<JobExecution>> {
        let executions = self.executions.read().await;
        Ok(executions.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::batch::{BatchStatus, JobParameters};
    use bigdecimal::BigDecimal;

    fn product(name: &str) -> Product {
        Product::builder().name(name).build().unwrap()
    }

    #[tokio::test]
    async fn test_ids_assigned_from_one() {
        let repository = InMemoryProductRepository::new();
        let saved = repository
            .save_all(&[product("a"), product("b")])
            .await
            .unwrap();

        assert_eq!(saved[0].id.unwrap().value(), 1);
        assert_eq!(saved[1].id.unwrap().value(), 2);
        assert_eq!(repository.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invalid_product_rolls_back_whole_batch() {
        let repository = InMemoryProductRepository::new();
        repository.save_all(&[product("kept")]).await.unwrap();

        let mut bad = product("bad");
        bad.price = BigDecimal::from(-1);
        let err = repository
            .save_all(&[product("a"), bad, product("c")])
            .await
            .unwrap_err();

        assert!(matches!(err, FerryError::Validation(_)));
        assert_eq!(repository.count().await.unwrap(), 1);

        // The failed batch did not consume ids either
        let saved = repository.save_all(&[product("next")]).await.unwrap();
        assert_eq!(saved[0].id.unwrap().value(), 2);
    }

    #[tokio::test]
    async fn test_existing_id_updates_in_place() {
        let repository = InMemoryProductRepository::new();
        let saved = repository.save_all(&[product("old")]).await.unwrap();

        let mut renamed = saved[0].clone();
        renamed.name = "new".to_string();
        repository.save_all(&[renamed]).await.unwrap();

        let page = repository.find_page(0, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "new");
    }

    #[tokio::test]
    async fn test_unknown_id_rejected() {
        let repository = InMemoryProductRepository::new();
        let ghost = product("ghost").with_id(ProductId::new(7).unwrap());
        assert!(repository.save_all(&[ghost]).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_id_rolls_back_whole_batch() {
        let repository = InMemoryProductRepository::new();
        repository.save_all(&[product("kept")]).await.unwrap();

        let ghost = product("ghost").with_id(ProductId::new(99).unwrap());
        let err = repository
            .save_all(&[product("fresh"), ghost])
            .await
            .unwrap_err();

        assert!(matches!(err, FerryError::Validation(_)));
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_page_past_end_is_empty() {
        let repository = InMemoryProductRepository::new();
        repository.save_all(&[product("a")]).await.unwrap();
        assert!(repository.find_page(3, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_job_repository_upserts_and_orders() {
        let repository = InMemoryJobRepository::new();
        let params = JobParameters::builder().add_string("k", "v").build();

        let mut first = JobExecution::new("job", params.clone());
        repository.save_job_execution(&first).await.unwrap();
        first.transition(BatchStatus::Started).unwrap();
        repository.save_job_execution(&first).await.unwrap();

        let second = JobExecution::new("job", params);
        repository.save_job_execution(&second).await.unwrap();

        let last = repository
            .find_last_job_execution("job", &second.instance_key)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.id, second.id);

        let stored = repository.get(&first.id).await.unwrap();
        assert_eq!(stored.status, BatchStatus::Started);

        let recent = repository.find_recent_job_executions(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second.id);
    }

    #[tokio::test]
    async fn test_unknown_instance_has_no_execution() {
        let repository = InMemoryJobRepository::new();
        let key = JobExecution::new("job", JobParameters::default()).instance_key;
        assert!(repository
            .find_last_job_execution("job", &key)
            .await
            .unwrap()
            .is_none());
    }
}
