//! Change-set reduction
//!
//! Collapses the per-commit snapshot stream into transition events. Within
//! each key, snapshots are ordered by commit time and a snapshot is kept only
//! when the next snapshot of the same key has a different fingerprint. The
//! last snapshot of every key is always kept.
//!
//! For fingerprints `[A, A, B, B, C]` at `t0..t4` the retained events are
//! `t1 (A)`, `t3 (B)` and `t4 (C)`: each event carries the last commit at
//! which its state was still current.

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::fingerprint::Fingerprint;
use crate::models::{ChangeEvent, EntitySnapshot};

/// Buffers snapshots per key until the commit stream is exhausted.
///
/// Reduction needs look-ahead to the next snapshot of each key, so nothing
/// can be emitted before [`ChangeSetReducer::finish`].
#[derive(Debug, Default)]
pub struct ChangeSetReducer {
    groups: BTreeMap<String, Vec<EntitySnapshot>>,
    snapshots: usize,
}

impl ChangeSetReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one snapshot to its key's group
    pub fn push(&mut self, snapshot: EntitySnapshot) {
        self.snapshots += 1;
        self.groups
            .entry(snapshot.key.clone())
            .or_default()
            .push(snapshot);
    }

    /// Number of buffered snapshots
    pub fn len(&self) -> usize {
        self.snapshots
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots == 0
    }

    /// Number of distinct keys seen so far
    pub fn key_count(&self) -> usize {
        self.groups.len()
    }

    /// Reduces all buffered snapshots.
    ///
    /// Output is ordered by key, then by commit timestamp within a key.
    pub fn finish(self) -> Result<Vec<ChangeEvent>, CoreError> {
        let mut events = Vec::new();
        for (_, group) in self.groups {
            reduce_group(group, &mut events)?;
        }
        Ok(events)
    }
}

impl Extend<EntitySnapshot> for ChangeSetReducer {
    fn extend<I: IntoIterator<Item = EntitySnapshot>>(&mut self, iter: I) {
        for snapshot in iter {
            self.push(snapshot);
        }
    }
}

/// Reduces a complete snapshot stream in one call
pub fn reduce<I>(snapshots: I) -> Result<Vec<ChangeEvent>, CoreError>
where
    I: IntoIterator<Item = EntitySnapshot>,
{
    let mut reducer = ChangeSetReducer::new();
    reducer.extend(snapshots);
    reducer.finish()
}

/// Reduces the snapshots of a single key, appending retained events to `out`
fn reduce_group(mut group: Vec<EntitySnapshot>, out: &mut Vec<ChangeEvent>) -> Result<(), CoreError> {
    // Stable: commits sharing a timestamp keep their arrival order
    group.sort_by_key(|snapshot| snapshot.commit.timestamp);

    let fingerprints = group
        .iter()
        .map(|snapshot| Fingerprint::of(&snapshot.fields))
        .collect::<Result<Vec<_>, _>>()?;

    let mut next_fingerprints = fingerprints.iter().skip(1);
    for (snapshot, fingerprint) in group.into_iter().zip(fingerprints.iter()) {
        let keep = match next_fingerprints.next() {
            Some(next) => next != fingerprint,
            None => true,
        };
        if keep {
            out.push(ChangeEvent {
                key: snapshot.key,
                fields: snapshot.fields,
                fingerprint: fingerprint.clone(),
                commit: snapshot.commit,
            });
        }
    }
    Ok(())
}
