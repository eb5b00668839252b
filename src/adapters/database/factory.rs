//! Repository factory
//!
//! This module creates the product and job repositories selected by
//! `database_target`. Both repositories share one backend.

use crate::adapters::database::traits::{JobRepository, ProductRepository};
use crate::adapters::memory::{InMemoryJobRepository, InMemoryProductRepository};
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::{DatabaseTarget, FerryConfig};
use crate::domain::{FerryError, Result};
use std::sync::Arc;

/// Product and job repositories backed by the same store
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub jobs: Arc<dyn JobRepository>,
}

/// Create both repositories from the configuration
///
/// For PostgreSQL the connection is tested and the schema created before
/// returning.
///
/// # Errors
///
/// Returns `FerryError::Configuration` if the selected backend has no
/// configuration section, or a store error if the database is unreachable.
pub async fn create_repositories(config: &FerryConfig) -> Result<Repositories> {
    match config.database_target {
        DatabaseTarget::Memory => {
            tracing::info!("Using in-memory repositories");
            Ok(Repositories {
                products: Arc::new(InMemoryProductRepository::new()),
                jobs: Arc::new(InMemoryJobRepository::new()),
            })
        }
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                FerryError::Configuration(
                    "postgresql configuration is required when database_target is 'postgresql'"
                        .to_string(),
                )
            })?;

            let client = PostgreSQLClient::new(pg_config.clone())?;
            tracing::info!(
                server = %client.connection_string_safe(),
                "Creating PostgreSQL repositories"
            );

            client.test_connection().await?;
            client.ensure_schema().await?;

            let adapter = Arc::new(PostgreSQLAdapter::new(client));
            Ok(Repositories {
                products: adapter.clone(),
                jobs: adapter,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_target() {
        let repositories = create_repositories(&FerryConfig::default()).await.unwrap();
        assert_eq!(repositories.products.count().await.unwrap(), 0);
        assert!(repositories
            .jobs
            .find_recent_job_executions(10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_postgresql_without_section() {
        let config = FerryConfig {
            database_target: DatabaseTarget::PostgreSQL,
            ..FerryConfig::default()
        };

        let err = create_repositories(&config).await.err().unwrap();
        assert!(err.is_configuration());
    }
}
