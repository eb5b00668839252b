//! Delimited product file reader
//!
//! The first line is a header and is discarded. Every following non-blank
//! line is split on the delimiter into `name, description, price, quantity`.
//! Tokenization is lenient: missing trailing fields take defaults, extra
//! fields are ignored and quotes have no special meaning.

use crate::core::batch::ItemReader;
use crate::domain::{FerryError, Product, Result};
use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use csv_async::{AsyncReader, AsyncReaderBuilder, StringRecord};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs::File;

const NAME: usize = 0;
const DESCRIPTION: usize = 1;
const PRICE: usize = 2;
const QUANTITY: usize = 3;

/// Reads [`Product`] records from a delimited file
pub struct ProductFileReader {
    path: PathBuf,
    delimiter: u8,
    reader: Option<AsyncReader<File>>,
    record: StringRecord,
}

impl ProductFileReader {
    /// Reader over `path` using `,` as delimiter
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
            reader: None,
            record: StringRecord::new(),
        }
    }

    /// Use a different single-byte delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The file being read
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ItemReader<Product> for ProductFileReader {
    async fn open(&mut self) -> Result<()> {
        let file = File::open(&self.path).await.map_err(|e| {
            FerryError::Configuration(format!(
                "Cannot open input file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let reader = AsyncReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .delimiter(self.delimiter)
            .create_reader(file);

        tracing::debug!(path = %self.path.display(), "Opened product file");
        self.reader = Some(reader);
        Ok(())
    }

    async fn read(&mut self) -> Result<Option<Product>> {
        let reader = self.reader.as_mut().ok_or_else(|| {
            FerryError::State(format!(
                "reader for {} used before open",
                self.path.display()
            ))
        })?;

        loop {
            let has_record = reader
                .read_record(&mut self.record)
                .await
                .map_err(read_error)?;
            if !has_record {
                return Ok(None);
            }

            if self.record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let line = self.record.position().map(|p| p.line()).unwrap_or(0);
            return parse_product(&self.record, line).map(Some);
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.reader = None;
        Ok(())
    }
}

/// Map one record to a product, applying defaults for missing fields
fn parse_product(record: &StringRecord, line: u64) -> Result<Product> {
    let field = |index: usize| record.get(index).unwrap_or("");

    let price_text = field(PRICE).trim();
    let price = if price_text.is_empty() {
        BigDecimal::zero()
    } else {
        BigDecimal::from_str(price_text).map_err(|e| FerryError::Parse {
            line,
            message: format!("invalid price '{price_text}': {e}"),
        })?
    };

    let quantity_text = field(QUANTITY).trim();
    let quantity = if quantity_text.is_empty() {
        0
    } else {
        quantity_text.parse::<i64>().map_err(|e| FerryError::Parse {
            line,
            message: format!("invalid quantity '{quantity_text}': {e}"),
        })?
    };

    Ok(Product {
        id: None,
        name: field(NAME).to_string(),
        description: field(DESCRIPTION).to_string(),
        price,
        quantity,
    })
}

fn read_error(err: csv_async::Error) -> FerryError {
    match err.position() {
        Some(position) => FerryError::Parse {
            line: position.line(),
            message: err.to_string(),
        },
        None => FerryError::Io(err.to_string()),
    }
}
