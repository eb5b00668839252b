//! Key/value scratch space scoped to one job or step execution

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Execution context
///
/// Holds derived configuration passed between lifecycle phases (for example
/// the resolved input file path) and restart bookkeeping such as the number
/// of records already committed by a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    entries: BTreeMap<String, Value>,
}

impl ExecutionContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a string value
    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Value::String(value.into()));
    }

    /// Store an integer value
    pub fn put_u64(&mut self, key: impl Into<String>, value: u64) {
        self.entries.insert(key.into(), Value::from(value));
    }

    /// Read a string value
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    /// Read an integer value
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.entries.get(key).and_then(Value::as_u64)
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Whether the context holds nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the context for storage
    pub fn to_json(&self) -> Value {
        Value::Object(self.entries.clone().into_iter().collect())
    }

    /// Rebuild a context from stored JSON; non-object values yield an empty context
    pub fn from_json(value: &Value) -> Self {
        let entries = value
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        Self { entries }
    }
}
