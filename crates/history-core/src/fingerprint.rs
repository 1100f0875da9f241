//! Content fingerprints of entity states
//!
//! A fingerprint is the SHA-256 of the canonical JSON encoding of an entity's
//! fields: object keys sorted recursively, no insignificant whitespace.
//! Commit metadata never enters the digest, so the same state observed in two
//! commits yields the same fingerprint.

use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::CoreError;
use crate::models::EntityFields;

/// Hex-encoded SHA-256 digest of an entity state
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of a field map
    pub fn of(fields: &EntityFields) -> Result<Self, CoreError> {
        let bytes = to_canonical_json(fields)?;
        let digest = Sha256::digest(&bytes);
        Ok(Self(HEXLOWER.encode(&digest)))
    }

    /// Rebuilds a fingerprint from its raw 32-byte digest
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        Self(HEXLOWER.encode(digest))
    }

    /// Raw 32-byte digest
    pub fn digest(&self) -> Result<[u8; 32], CoreError> {
        let bytes = HEXLOWER
            .decode(self.0.as_bytes())
            .map_err(|e| CoreError::InvalidFingerprint(format!("{}: {}", self.0, e)))?;
        bytes
            .try_into()
            .map_err(|_| CoreError::InvalidFingerprint(self.0.clone()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for display
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serializes a field map to canonical JSON bytes
pub fn to_canonical_json(fields: &EntityFields) -> Result<Vec<u8>, CoreError> {
    let value = serde_json::to_value(fields)?;
    Ok(serde_json::to_vec(&canon_value(value))?)
}

fn canon_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key, canon_value(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canon_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> EntityFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_identical_fields_same_fingerprint() {
        let a = fields(&[("heartbeat", json!("3600s")), ("decimals", json!(8))]);
        let b = fields(&[("decimals", json!(8)), ("heartbeat", json!("3600s"))]);
        assert_eq!(Fingerprint::of(&a).unwrap(), Fingerprint::of(&b).unwrap());
    }

    #[test]
    fn test_changed_field_changes_fingerprint() {
        let a = fields(&[("decimals", json!(8))]);
        let b = fields(&[("decimals", json!(18))]);
        assert_ne!(Fingerprint::of(&a).unwrap(), Fingerprint::of(&b).unwrap());
    }

    #[test]
    fn test_null_differs_from_missing() {
        let a = fields(&[("payment", Value::Null)]);
        let b = fields(&[]);
        assert_ne!(Fingerprint::of(&a).unwrap(), Fingerprint::of(&b).unwrap());
    }

    #[test]
    fn test_nested_objects_are_sorted() {
        let bytes = to_canonical_json(&fields(&[("cfg", json!({"b": 1, "a": {"d": 2, "c": 3}}))])).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), r#"{"cfg":{"a":{"c":3,"d":2},"b":1}}"#);
    }

    #[test]
    fn test_digest_roundtrip() {
        let fp = Fingerprint::of(&fields(&[("x", json!(1))])).unwrap();
        assert_eq!(fp.as_str().len(), 64);
        assert_eq!(Fingerprint::from_digest(&fp.digest().unwrap()), fp);
    }
}
