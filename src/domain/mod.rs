//! Domain models and types for Ferry.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **The record type** moved by every job ([`Product`])
//! - **Strongly-typed identifiers** ([`ProductId`], [`JobExecutionId`], [`JobInstanceKey`])
//! - **Error types** ([`FerryError`], [`StoreError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, FerryError>`]:
//!
//! ```rust
//! use ferry::domain::{FerryError, Result};
//!
//! fn example() -> Result<()> {
//!     // Errors are automatically converted using the ? operator
//!     let config = ferry::config::load_config("ferry.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod product;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{FerryError, StoreError};
pub use ids::{JobExecutionId, JobInstanceKey, ProductId};
pub use product::{Product, ProductBuilder};
pub use result::Result;
