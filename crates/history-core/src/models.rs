//! Core data models for the timeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::fingerprint::Fingerprint;

/// Field name → value mapping of a single entity.
///
/// A `BTreeMap` keeps field order stable, which the fingerprint relies on.
pub type EntityFields = BTreeMap<String, Value>;

/// A commit that touched the tracked file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Commit {
    /// Full commit SHA
    pub sha: String,

    /// Author timestamp (Unix epoch, seconds)
    pub timestamp: i64,
}

impl Commit {
    /// Creates a new commit
    pub fn new(sha: impl Into<String>, timestamp: i64) -> Self {
        Self {
            sha: sha.into(),
            timestamp,
        }
    }

    /// First 8 characters of the SHA (or the whole SHA if shorter)
    pub fn short_sha(&self) -> &str {
        let end = self
            .sha
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.sha.len());
        &self.sha[..end]
    }

    /// Author date as a UTC datetime, if the timestamp is representable
    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.timestamp, 0)
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date() {
            Some(date) => write!(f, "{} ({})", self.short_sha(), date.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "{}", self.short_sha()),
        }
    }
}

/// State of one entity as observed in one commit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntitySnapshot {
    /// Entity key (e.g. a contract address)
    pub key: String,

    /// Entity fields; the only input of the fingerprint
    pub fields: EntityFields,

    /// Commit the snapshot was taken from
    pub commit: Commit,
}

impl EntitySnapshot {
    pub fn new(key: impl Into<String>, fields: EntityFields, commit: Commit) -> Self {
        Self {
            key: key.into(),
            fields,
            commit,
        }
    }
}

/// A retained snapshot marking the end of a run of identical states.
///
/// The commit is the last one observed with this exact state, not the first
/// one that introduced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangeEvent {
    pub key: String,
    pub fields: EntityFields,
    pub fingerprint: Fingerprint,
    pub commit: Commit,
}

impl ChangeEvent {
    /// Names of the fields whose value differs from `previous`
    /// (including fields present on only one side)
    pub fn changed_fields(&self, previous: &ChangeEvent) -> Vec<String> {
        let mut changed: Vec<String> = self
            .fields
            .iter()
            .filter(|(name, value)| previous.fields.get(*name) != Some(*value))
            .map(|(name, _)| name.clone())
            .collect();

        changed.extend(
            previous
                .fields
                .keys()
                .filter(|name| !self.fields.contains_key(*name))
                .cloned(),
        );
        changed.sort();
        changed
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} [{}]",
            self.key,
            self.commit,
            self.fingerprint.short()
        )
    }
}
