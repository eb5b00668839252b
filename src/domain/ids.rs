//! Domain identifier types
//!
//! Newtype wrappers that keep store-assigned product ids, execution ids and
//! job instance keys from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned product identifier
///
/// Ids are assigned by the persistence store on first write and are always
/// positive.
///
/// # Examples
///
/// ```
/// use ferry::domain::ids::ProductId;
/// use std::str::FromStr;
///
/// let id = ProductId::from_str("42").unwrap();
/// assert_eq!(id.value(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(i64);

impl ProductId {
    /// Creates a new ProductId
    ///
    /// # Returns
    ///
    /// Returns `Err` if the value is not positive
    pub fn new(value: i64) -> Result<Self, String> {
        if value <= 0 {
            return Err(format!("Product ID must be positive, got {value}"));
        }
        Ok(Self(value))
    }

    /// Returns the raw id
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("Invalid product ID '{s}': {e}"))?;
        Self::new(value)
    }
}

/// Unique identifier of one job execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobExecutionId(Uuid);

impl JobExecutionId {
    /// Generates a fresh random execution id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for JobExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a logical job instance
///
/// A hex-encoded SHA-256 digest over the job name and its identifying
/// parameters. Runs sharing a key are attempts at the same instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobInstanceKey(String);

impl JobInstanceKey {
    /// Creates a key from an already computed digest
    pub fn new(key: impl Into<String>) -> Result<Self, String> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err("Job instance key cannot be empty".to_string());
        }
        Ok(Self(key))
    }

    pub(crate) fn from_digest(hex: String) -> Self {
        Self(hex)
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First twelve characters, for log lines and tables
    pub fn short(&self) -> &str {
        let end = self.0.len().min(12);
        &self.0[..end]
    }
}

impl fmt::Display for JobInstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for JobInstanceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
