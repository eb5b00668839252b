//! PostgreSQL row models
//!
//! Mapping between table rows and the domain types. Prices travel as text
//! (`price::text` on read, `$n::text::numeric` on write) so decimals keep
//! their exact scale.

use crate::core::batch::context::ExecutionContext;
use crate::core::batch::execution::{JobExecution, StepExecution};
use crate::core::batch::parameters::JobParameters;
use crate::core::batch::status::BatchStatus;
use crate::domain::ids::{JobExecutionId, JobInstanceKey, ProductId};
use crate::domain::{FerryError, Product, Result, StoreError};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::str::FromStr;
use tokio_postgres::Row;
use uuid::Uuid;

/// Columns selected when loading products
pub const PRODUCT_COLUMNS: &str = "id, name, description, price::text AS price, quantity";

/// Columns selected when loading job executions
pub const JOB_EXECUTION_COLUMNS: &str = "id, job_name, instance_key, status, parameters, \
     step_executions, execution_context, failures, create_time, start_time, end_time";

/// Row of the `products` table
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: i64,
}

impl ProductRow {
    /// Read a row selected with [`PRODUCT_COLUMNS`]
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, "id")?,
            name: column(row, "name")?,
            description: column(row, "description")?,
            price: column(row, "price")?,
            quantity: column(row, "quantity")?,
        })
    }

    /// Convert to the domain model
    pub fn into_domain(self) -> Result<Product> {
        let id = ProductId::new(self.id).map_err(StoreError::InvalidRow)?;
        let price = BigDecimal::from_str(&self.price).map_err(|e| {
            StoreError::InvalidRow(format!("product {} has price '{}': {e}", self.id, self.price))
        })?;

        Ok(Product {
            id: Some(id),
            name: self.name,
            description: self.description,
            price,
            quantity: self.quantity,
        })
    }
}

/// Row of the `batch_job_executions` table
///
/// Parameters, step executions, the execution context and failures are kept
/// as JSONB documents.
#[derive(Debug, Clone)]
pub struct JobExecutionRow {
    pub id: Uuid,
    pub job_name: String,
    pub instance_key: String,
    pub status: String,
    pub parameters: Value,
    pub step_executions: Value,
    pub execution_context: Value,
    pub failures: Value,
    pub create_time: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl JobExecutionRow {
    /// Build a row from the domain model
    pub fn from_domain(execution: &JobExecution) -> Result<Self> {
        Ok(Self {
            id: *execution.id.as_uuid(),
            job_name: execution.job_name.clone(),
            instance_key: execution.instance_key.as_str().to_string(),
            status: execution.status.as_str().to_string(),
            parameters: serde_json::to_value(&execution.parameters)?,
            step_executions: serde_json::to_value(&execution.step_executions)?,
            execution_context: execution.execution_context.to_json(),
            failures: serde_json::to_value(&execution.failures)?,
            create_time: execution.create_time,
            start_time: execution.start_time,
            end_time: execution.end_time,
        })
    }

    /// Read a row selected with [`JOB_EXECUTION_COLUMNS`]
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: column(row, "id")?,
            job_name: column(row, "job_name")?,
            instance_key: column(row, "instance_key")?,
            status: column(row, "status")?,
            parameters: column(row, "parameters")?,
            step_executions: column(row, "step_executions")?,
            execution_context: column(row, "execution_context")?,
            failures: column(row, "failures")?,
            create_time: column(row, "create_time")?,
            start_time: column(row, "start_time")?,
            end_time: column(row, "end_time")?,
        })
    }

    /// Convert to the domain model
    pub fn into_domain(self) -> Result<JobExecution> {
        let status = BatchStatus::from_str(&self.status).map_err(StoreError::InvalidRow)?;
        let instance_key = JobInstanceKey::new(self.instance_key).map_err(StoreError::InvalidRow)?;
        let parameters: JobParameters = serde_json::from_value(self.parameters)?;
        let step_executions: Vec<StepExecution> = serde_json::from_value(self.step_executions)?;
        let failures: Vec<String> = serde_json::from_value(self.failures)?;

        Ok(JobExecution {
            id: JobExecutionId::from_uuid(self.id),
            job_name: self.job_name,
            instance_key,
            parameters,
            status,
            step_executions,
            execution_context: ExecutionContext::from_json(&self.execution_context),
            create_time: self.create_time,
            start_time: self.start_time,
            end_time: self.end_time,
            failures,
        })
    }
}

fn column<'a, T>(row: &'a Row, name: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name)
        .map_err(|e| FerryError::Store(StoreError::InvalidRow(format!("column {name}: {e}"))))
}
