//! History Core - Shared data models and the change-set reduction
//!
//! This crate defines the timeline data structures (`Commit`,
//! `EntitySnapshot`, `ChangeEvent`), content fingerprints, the entity
//! extractors that map a configuration document to keyed entities, and the
//! reducer that collapses per-commit snapshots into transition events.

mod contracts;
mod document;
mod error;
mod extract;
mod fingerprint;
mod models;
mod reducer;

pub use contracts::ContractExtractor;
pub use document::{lookup, value_or_null, Document};
pub use error::CoreError;
pub use extract::{EntityExtractor, FlattenExtractor};
pub use fingerprint::{to_canonical_json, Fingerprint};
pub use models::{ChangeEvent, Commit, EntityFields, EntitySnapshot};
pub use reducer::{reduce, ChangeSetReducer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_short_sha() {
        let commit = Commit::new("1bacd894237084a8343fbc4952c161435937ee96", 0);
        assert_eq!(commit.short_sha(), "1bacd894");
        assert_eq!(Commit::new("abc", 0).short_sha(), "abc");
    }

    #[test]
    fn test_commit_display_has_date() {
        let commit = Commit::new("1bacd894237084a8343fbc4952c161435937ee96", 1_600_000_000);
        assert_eq!(commit.to_string(), "1bacd894 (2020-09-13 12:26:40)");
    }
}
