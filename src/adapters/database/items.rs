//! Item reader and writer backed by a [`ProductRepository`]

use super::traits::ProductRepository;
use crate::core::batch::{ItemReader, ItemWriter};
use crate::domain::{FerryError, Product, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;

/// Pages through the repository in id order
///
/// Each page is fetched on demand. The scan ends at the first page holding
/// fewer records than the page size.
pub struct RepositoryItemReader {
    repository: Arc<dyn ProductRepository>,
    page_size: usize,
    next_page: usize,
    buffer: VecDeque<Product>,
    exhausted: bool,
}

impl RepositoryItemReader {
    /// Reader fetching `page_size` products per query
    ///
    /// # Errors
    ///
    /// Returns `FerryError::Configuration` if `page_size` is zero.
    pub fn new(repository: Arc<dyn ProductRepository>, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(FerryError::Configuration(
                "page size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            repository,
            page_size,
            next_page: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }
}

#[async_trait]
impl ItemReader<Product> for RepositoryItemReader {
    async fn open(&mut self) -> Result<()> {
        self.next_page = 0;
        self.buffer.clear();
        self.exhausted = false;
        Ok(())
    }

    async fn read(&mut self) -> Result<Option<Product>> {
        if self.buffer.is_empty() && !self.exhausted {
            let page = self
                .repository
                .find_page(self.next_page, self.page_size)
                .await?;

            tracing::trace!(
                page = self.next_page,
                size = page.len(),
                "Fetched product page"
            );

            self.exhausted = page.len() < self.page_size;
            self.next_page += 1;
            self.buffer.extend(page);
        }

        Ok(self.buffer.pop_front())
    }
}

/// Saves each chunk with one `save_all` call
pub struct RepositoryItemWriter {
    repository: Arc<dyn ProductRepository>,
}

impl RepositoryItemWriter {
    /// Writer saving into `repository`
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ItemWriter<Product> for RepositoryItemWriter {
    async fn write(&mut self, chunk: &[Product]) -> Result<()> {
        let saved = self.repository.save_all(chunk).await?;
        tracing::trace!(count = saved.len(), "Saved product chunk");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryProductRepository;

    fn product(name: &str) -> Product {
        Product::builder().name(name).build().unwrap()
    }

    async fn seeded(count: usize) -> Arc<InMemoryProductRepository> {
        let repository = Arc::new(InMemoryProductRepository::new());
        let products: Vec<Product> = (0..count).map(|i| product(&format!("p{i}"))).collect();
        repository.save_all(&products).await.unwrap();
        repository
    }

    async fn drain(reader: &mut RepositoryItemReader) -> Vec<Product> {
        reader.open().await.unwrap();
        let mut out = Vec::new();
        while let Some(p) = reader.read().await.unwrap() {
            out.push(p);
        }
        out
    }

    #[tokio::test]
    async fn test_reads_all_pages_in_id_order() {
        let repository = seeded(25).await;
        let mut reader = RepositoryItemReader::new(repository, 10).unwrap();

        let products = drain(&mut reader).await;
        assert_eq!(products.len(), 25);
        let ids: Vec<i64> = products.iter().map(|p| p.id.unwrap().value()).collect();
        assert_eq!(ids, (1..=25).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_exact_multiple_of_page_size() {
        let repository = seeded(20).await;
        let mut reader = RepositoryItemReader::new(repository, 10).unwrap();
        assert_eq!(drain(&mut reader).await.len(), 20);
    }

    #[tokio::test]
    async fn test_empty_repository() {
        let repository = seeded(0).await;
        let mut reader = RepositoryItemReader::new(repository, 10).unwrap();
        assert!(drain(&mut reader).await.is_empty());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let repository = Arc::new(InMemoryProductRepository::new());
        assert!(RepositoryItemReader::new(repository, 0).is_err());
    }

    #[tokio::test]
    async fn test_writer_saves_chunk() {
        let repository = Arc::new(InMemoryProductRepository::new());
        let mut writer = RepositoryItemWriter::new(repository.clone());

        writer
            .write(&[product("a"), product("b")])
            .await
            .unwrap();
        assert_eq!(repository.count().await.unwrap(), 2);
    }
}
