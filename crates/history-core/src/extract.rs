//! Entity extraction from decoded documents
//!
//! An extractor turns one document, as of one commit, into entity snapshots.
//! Extractors are pure: a document they cannot make sense of yields no
//! entities rather than an error.

use serde_json::{Map, Value};

use crate::document::Document;
use crate::models::{Commit, EntityFields, EntitySnapshot};

/// Schema mapping from a document to keyed entities
pub trait EntityExtractor {
    fn extract(&self, document: &Document, commit: &Commit) -> Vec<EntitySnapshot>;
}

impl<F> EntityExtractor for F
where
    F: Fn(&Document, &Commit) -> Vec<EntitySnapshot>,
{
    fn extract(&self, document: &Document, commit: &Commit) -> Vec<EntitySnapshot> {
        self(document, commit)
    }
}

/// Generic extractor: each member of a top-level object is an entity.
///
/// Nested objects are flattened into dot-joined field names, so
/// `{"billing": {"payment": 1}}` becomes the field `billing.payment`.
/// Members that are not objects become an entity with a single `value` field.
#[derive(Debug, Clone)]
pub struct FlattenExtractor {
    collection: String,
}

impl FlattenExtractor {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }
}

impl EntityExtractor for FlattenExtractor {
    fn extract(&self, document: &Document, commit: &Commit) -> Vec<EntitySnapshot> {
        let Some(members) = document.object_at(&[self.collection.as_str()]) else {
            log::debug!(
                "No '{}' object in document at {}",
                self.collection,
                commit.short_sha()
            );
            return Vec::new();
        };

        members
            .iter()
            .map(|(key, value)| {
                let mut fields = EntityFields::new();
                match value {
                    Value::Object(map) => flatten_into(&mut fields, "", map),
                    other => {
                        fields.insert("value".to_string(), other.clone());
                    }
                }
                EntitySnapshot::new(key.clone(), fields, commit.clone())
            })
            .collect()
    }
}

fn flatten_into(fields: &mut EntityFields, prefix: &str, map: &Map<String, Value>) {
    for (name, value) in map {
        let full_name = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(fields, &full_name, inner),
            other => {
                fields.insert(full_name, other.clone());
            }
        }
    }
}
