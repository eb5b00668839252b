//! Delimited file adapters
//!
//! - [`ProductFileReader`] - Import source, one product per line after a header
//! - [`ProductFileWriter`] - Export sink, fixed header then one product per line

pub mod reader;
pub mod writer;

pub use reader::ProductFileReader;
pub use writer::{ProductFileWriter, EXPORT_HEADER};
