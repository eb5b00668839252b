//! PostgreSQL adapter implementing the repository traits

use crate::adapters::database::traits::{JobRepository, ProductRepository};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    JobExecutionRow, ProductRow, JOB_EXECUTION_COLUMNS, PRODUCT_COLUMNS,
};
use crate::core::batch::execution::JobExecution;
use crate::domain::ids::JobInstanceKey;
use crate::domain::{FerryError, Product, Result, StoreError};
use async_trait::async_trait;
use std::sync::Arc;

/// PostgreSQL implementation of [`ProductRepository`] and [`JobRepository`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Create a new PostgreSQL adapter with an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

fn query_failed(e: tokio_postgres::Error) -> FerryError {
    FerryError::Store(StoreError::QueryFailed(e.to_string()))
}

fn transaction_failed(e: tokio_postgres::Error) -> FerryError {
    FerryError::Store(StoreError::TransactionFailed(e.to_string()))
}

#[async_trait]
impl ProductRepository for PostgreSQLAdapter {
    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn save_all(&self, products: &[Product]) -> Result<Vec<Product>> {
        for product in products {
            product.validate()?;
        }

        let mut conn = self.client.get_connection().await?;
        let tx = conn.transaction().await.map_err(transaction_failed)?;

        let insert = tx
            .prepare(&format!(
                "INSERT INTO products (name, description, price, quantity) \
                 VALUES ($1, $2, $3::text::numeric, $4) RETURNING {PRODUCT_COLUMNS}"
            ))
            .await
            .map_err(query_failed)?;
        let update = tx
            .prepare(&format!(
                "UPDATE products SET name = $2, description = $3, \
                 price = $4::text::numeric, quantity = $5 WHERE id = $1 \
                 RETURNING {PRODUCT_COLUMNS}"
            ))
            .await
            .map_err(query_failed)?;

        let mut saved = Vec::with_capacity(products.len());
        for product in products {
            let price = product.price.to_plain_string();
            let row = match product.id {
                None => tx
                    .query_one(
                        &insert,
                        &[&product.name, &product.description, &price, &product.quantity],
                    )
                    .await
                    .map_err(query_failed)?,
                Some(id) => tx
                    .query_opt(
                        &update,
                        &[
                            &id.value(),
                            &product.name,
                            &product.description,
                            &price,
                            &product.quantity,
                        ],
                    )
                    .await
                    .map_err(query_failed)?
                    .ok_or_else(|| {
                        FerryError::Validation(format!("product {id} does not exist"))
                    })?,
            };
            saved.push(ProductRow::from_row(&row)?.into_domain()?);
        }

        // An early return above drops `tx`, which rolls the transaction back
        tx.commit().await.map_err(transaction_failed)?;

        tracing::trace!(count = saved.len(), "Committed product batch");
        Ok(saved)
    }

    async fn find_page(&self, page: usize, size: usize) -> Result<Vec<Product>> {
        let limit = i64::try_from(size)
            .map_err(|_| FerryError::Configuration(format!("page size {size} is too large")))?;
        let offset = i64::try_from(page.saturating_mul(size))
            .map_err(|_| FerryError::Configuration(format!("page {page} is out of range")))?;

        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC LIMIT $1 OFFSET $2"),
                &[&limit, &offset],
            )
            .await
            .map_err(query_failed)?;

        rows.iter()
            .map(|row| ProductRow::from_row(row)?.into_domain())
            .collect()
    }

    async fn count(&self) -> Result<u64> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_one("SELECT COUNT(*) FROM products", &[])
            .await
            .map_err(query_failed)?;

        let count: i64 = row.try_get(0).map_err(query_failed)?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl JobRepository for PostgreSQLAdapter {
    async fn save_job_execution(&self, execution: &JobExecution) -> Result<()> {
        let row = JobExecutionRow::from_domain(execution)?;

        let statement = r#"
            INSERT INTO batch_job_executions (
                id, job_name, instance_key, status, parameters, step_executions,
                execution_context, failures, create_time, start_time, end_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                step_executions = EXCLUDED.step_executions,
                execution_context = EXCLUDED.execution_context,
                failures = EXCLUDED.failures,
                start_time = EXCLUDED.start_time,
                end_time = EXCLUDED.end_time
        "#;

        let conn = self.client.get_connection().await?;
        conn.execute(
            statement,
            &[
                &row.id,
                &row.job_name,
                &row.instance_key,
                &row.status,
                &row.parameters,
                &row.step_executions,
                &row.execution_context,
                &row.failures,
                &row.create_time,
                &row.start_time,
                &row.end_time,
            ],
        )
        .await
        .map_err(query_failed)?;

        tracing::trace!(
            execution_id = %execution.id,
            status = %execution.status,
            "Saved job execution"
        );
        Ok(())
    }

    async fn find_last_job_execution(
        &self,
        job_name: &str,
        instance_key: &JobInstanceKey,
    ) -> Result<Option<JobExecution>> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_opt(
                &format!(
                    "SELECT {JOB_EXECUTION_COLUMNS} FROM batch_job_executions \
                     WHERE job_name = $1 AND instance_key = $2 \
                     ORDER BY create_time DESC LIMIT 1"
                ),
                &[&job_name, &instance_key.as_str()],
            )
            .await
            .map_err(query_failed)?;

        row.map(|row| JobExecutionRow::from_row(&row)?.into_domain())
            .transpose()
    }

    async fn find_recent_job_executions(&self, limit: usize) -> Result<Vec<JobExecution>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {JOB_EXECUTION_COLUMNS} FROM batch_job_executions \
                     ORDER BY create_time DESC LIMIT $1"
                ),
                &[&limit],
            )
            .await
            .map_err(query_failed)?;

        rows.iter()
            .map(|row| JobExecutionRow::from_row(row)?.into_domain())
            .collect()
    }
}
