//! Delimited product file writer

use crate::core::batch::ItemWriter;
use crate::domain::{FerryError, Product, Result};
use async_trait::async_trait;
use csv_async::{AsyncWriter, AsyncWriterBuilder, QuoteStyle};
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// Header row written once at open
pub const EXPORT_HEADER: [&str; 5] = ["id", "name", "description", "price", "quantity"];

/// Writes [`Product`] records to a delimited file
///
/// The target is created or truncated at open. Fields are written as is,
/// without quoting or escaping, and the file is flushed after every chunk.
pub struct ProductFileWriter {
    path: PathBuf,
    delimiter: u8,
    writer: Option<AsyncWriter<File>>,
}

impl ProductFileWriter {
    /// Writer to `path` using `,` as delimiter
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
            writer: None,
        }
    }

    /// Use a different single-byte delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The file being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, err: impl std::fmt::Display) -> FerryError {
        FerryError::Io(format!("{}: {}", self.path.display(), err))
    }
}

#[async_trait]
impl ItemWriter<Product> for ProductFileWriter {
    async fn open(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                FerryError::Configuration(format!(
                    "Cannot create output directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = File::create(&self.path).await.map_err(|e| {
            FerryError::Configuration(format!(
                "Cannot create output file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let mut writer = AsyncWriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Never)
            .has_headers(false)
            .create_writer(file);

        writer
            .write_record(&EXPORT_HEADER)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::debug!(path = %self.path.display(), "Opened export file");
        self.writer = Some(writer);
        Ok(())
    }

    async fn write(&mut self, chunk: &[Product]) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(FerryError::State(format!(
                "writer for {} used before open",
                self.path.display()
            )));
        };

        for product in chunk {
            let id = product.id.map(|id| id.to_string()).unwrap_or_default();
            let price = product.price.to_plain_string();
            let quantity = product.quantity.to_string();
            let fields = [
                id.as_str(),
                product.name.as_str(),
                product.description.as_str(),
                price.as_str(),
                quantity.as_str(),
            ];

            if let Err(e) = writer.write_record(&fields).await {
                return Err(self.io_error(e));
            }
        }

        if let Err(e) = writer.flush().await {
            return Err(self.io_error(e));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await.map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductId;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn stored(id: i64, name: &str, description: &str, price: &str, quantity: i64) -> Product {
        Product {
            id: Some(ProductId::new(id).unwrap()),
            name: name.to_string(),
            description: description.to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut writer = ProductFileWriter::new(&path);

        writer.open().await.unwrap();
        writer
            .write(&[stored(1, "Widget", "A small widget", "9.99", 100)])
            .await
            .unwrap();
        writer
            .write(&[stored(2, "Gadget", "Shiny", "0", 0)])
            .await
            .unwrap();
        writer.close().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "id,name,description,price,quantity\n1,Widget,A small widget,9.99,100\n2,Gadget,Shiny,0,0\n"
        );
    }

    #[tokio::test]
    async fn test_no_rows_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let mut writer = ProductFileWriter::new(&path);

        writer.open().await.unwrap();
        writer.close().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "id,name,description,price,quantity\n");
    }

    #[tokio::test]
    async fn test_fields_are_not_quoted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut writer = ProductFileWriter::new(&path);

        writer.open().await.unwrap();
        writer
            .write(&[stored(3, "Say \"hi\"", "a, b", "1.50", 2)])
            .await
            .unwrap();
        writer.close().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.ends_with("3,Say \"hi\",a, b,1.50,2\n"));
    }

    #[tokio::test]
    async fn test_truncates_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale contents that are longer than the header\n").unwrap();

        let mut writer = ProductFileWriter::new(&path);
        writer.open().await.unwrap();
        writer.close().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "id,name,description,price,quantity\n");
    }

    #[tokio::test]
    async fn test_small_prices_stay_in_plain_notation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut writer = ProductFileWriter::new(&path);

        writer.open().await.unwrap();
        writer
            .write(&[stored(1, "Tiny", "t", "0.0000001", 1)])
            .await
            .unwrap();
        writer.close().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.ends_with("1,Tiny,t,0.0000001,1\n"));
    }

    #[tokio::test]
    async fn test_write_before_open_fails() {
        let mut writer = ProductFileWriter::new("/tmp/never-opened.csv");
        assert!(writer.write(&[]).await.is_err());
    }
}
