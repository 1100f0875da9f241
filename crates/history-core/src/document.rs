//! Tolerant access to loosely-typed configuration documents

use serde_json::{Map, Value};

use crate::error::CoreError;

/// A parsed JSON document.
///
/// Accessors take a path of object keys and return `None` when any segment is
/// missing or the value has a different type. They never fail.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parses raw bytes as JSON
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let root = serde_json::from_slice(bytes)
            .map_err(|e| CoreError::MalformedDocument(e.to_string()))?;
        Ok(Self { root })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Value at `path`, if present
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        lookup(&self.root, path)
    }

    pub fn str_at(&self, path: &[&str]) -> Option<&str> {
        self.get(path)?.as_str()
    }

    pub fn i64_at(&self, path: &[&str]) -> Option<i64> {
        self.get(path)?.as_i64()
    }

    pub fn object_at(&self, path: &[&str]) -> Option<&Map<String, Value>> {
        self.get(path)?.as_object()
    }
}

/// Follows `path` through nested objects starting at `value`
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, segment| current.as_object()?.get(*segment))
}

/// Value at `path` inside `value`, or JSON null when absent
pub fn value_or_null(value: &Value, path: &[&str]) -> Value {
    lookup(value, path).cloned().unwrap_or(Value::Null)
}
