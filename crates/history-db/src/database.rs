//! Database operations and management

use anyhow::{bail, Context, Result};
use data_encoding::HEXLOWER;
use history_core::{to_canonical_json, ChangeEvent, Commit, EntityFields, Fingerprint};
use serde::{Deserialize, Serialize};
use sled::Db;
use std::collections::BTreeSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// Compact binary storage format
// ---------------------------------------------------------------------------

/// Internal representation stored in sled. Commit SHA and fingerprint are
/// kept as raw bytes; fields are canonical JSON text, since bincode cannot
/// round-trip arbitrary `serde_json::Value`s.
#[derive(Serialize, Deserialize)]
struct StoredEvent {
    key: String,
    commit_sha: [u8; 20],
    timestamp: i64,
    fingerprint: [u8; 32],
    fields: String,
}

/// Separator between the parts of a storage key
const SEP: u8 = 0;

/// Builds `"{entity_key}\0{timestamp}{seq}\0{sha}"` with a big-endian,
/// sign-flipped timestamp so byte order matches time order. `seq` is the
/// event's position in the stored timeline and breaks timestamp ties.
fn event_key(event: &ChangeEvent, seq: u64, sha: &[u8; 20]) -> Vec<u8> {
    let mut key = key_prefix(&event.key);
    key.extend_from_slice(&((event.commit.timestamp as u64) ^ (1 << 63)).to_be_bytes());
    key.extend_from_slice(&seq.to_be_bytes());
    key.push(SEP);
    key.extend_from_slice(sha);
    key
}

fn key_prefix(entity_key: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(entity_key.len() + 38);
    prefix.extend_from_slice(entity_key.as_bytes());
    prefix.push(SEP);
    prefix
}

fn decode_sha(sha: &str) -> Result<[u8; 20]> {
    let bytes = HEXLOWER
        .decode(sha.to_ascii_lowercase().as_bytes())
        .with_context(|| format!("Invalid commit SHA hex encoding: {}", sha))?;
    if bytes.len() != 20 {
        bail!("Commit SHA must be 40 hex characters: {}", sha);
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Serialize a `ChangeEvent` into its storage key and compact binary value.
fn pack(event: &ChangeEvent, seq: u64) -> Result<(Vec<u8>, Vec<u8>)> {
    let commit_sha = decode_sha(&event.commit.sha)?;
    let fingerprint = event.fingerprint.digest().context("Invalid fingerprint")?;
    let fields = String::from_utf8(to_canonical_json(&event.fields)?).context("Fields are not valid UTF-8")?;

    let stored = StoredEvent {
        key: event.key.clone(),
        commit_sha,
        timestamp: event.commit.timestamp,
        fingerprint,
        fields,
    };
    let value = bincode::serialize(&stored).context("Failed to serialize ChangeEvent")?;
    Ok((event_key(event, seq, &commit_sha), value))
}

/// Deserialize a `ChangeEvent` from compact binary bytes.
fn unpack(bytes: &[u8]) -> Result<ChangeEvent> {
    let stored: StoredEvent = bincode::deserialize(bytes).context("Failed to deserialize ChangeEvent")?;
    let fields: EntityFields = serde_json::from_str(&stored.fields).context("Failed to parse stored fields")?;
    Ok(ChangeEvent {
        key: stored.key,
        fields,
        fingerprint: Fingerprint::from_digest(&stored.fingerprint),
        commit: Commit::new(HEXLOWER.encode(&stored.commit_sha), stored.timestamp),
    })
}

/// Summary of one completed run, kept for `stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub repository: String,
    pub path: String,
    /// Most recent commit walked
    pub head_sha: Option<String>,
    /// Unix timestamp of the run
    pub recorded_at: i64,
    pub commits: usize,
    pub events: usize,
}

/// Main structure managing the database
pub struct TimelineDb {
    /// Change events (key: "entity_key\0timestamp seq\0sha")
    events: sled::Tree,

    /// Run records keyed by a monotonic id
    runs: sled::Tree,

    /// Sled database instance
    db: Db,
}

impl TimelineDb {
    /// Opens or creates a new database at the specified location
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", path.as_ref()))?;

        let events = db.open_tree("events").context("Failed to open events tree")?;
        let runs = db.open_tree("runs").context("Failed to open runs tree")?;

        Ok(Self { events, runs, db })
    }

    /// Replaces the stored timeline with `events`.
    ///
    /// A run always rebuilds the whole timeline, so nothing from an earlier
    /// run is kept. Events of one key with equal timestamps are read back in
    /// the order given here. Returns the number of events written.
    pub fn replace_events(&self, events: &[ChangeEvent]) -> Result<usize> {
        let mut batch = sled::Batch::default();
        for item in self.events.iter().keys() {
            batch.remove(item.context("Failed to read from database")?);
        }
        for (seq, event) in (0u64..).zip(events) {
            let (key, value) = pack(event, seq).with_context(|| format!("Cannot store event {}", event))?;
            batch.insert(key, value);
        }
        self.events
            .apply_batch(batch)
            .context("Failed to write change events")?;
        log::debug!("Stored {} change events", events.len());
        Ok(events.len())
    }

    /// Events of one entity, oldest first
    pub fn events_for(&self, entity_key: &str) -> Result<Vec<ChangeEvent>> {
        self.events
            .scan_prefix(key_prefix(entity_key))
            .values()
            .map(|value| unpack(&value.context("Failed to read from database")?))
            .collect()
    }

    /// Every event, ordered by entity key then time
    pub fn all_events(&self) -> Result<Vec<ChangeEvent>> {
        self.events
            .iter()
            .values()
            .map(|value| unpack(&value.context("Failed to read from database")?))
            .collect()
    }

    /// Distinct entity keys, sorted. Scans keys only.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.collect_keys(&[])
    }

    /// Distinct entity keys starting with `prefix`
    pub fn search_keys(&self, prefix: &str) -> Result<Vec<String>> {
        self.collect_keys(prefix.as_bytes())
    }

    fn collect_keys(&self, prefix: &[u8]) -> Result<Vec<String>> {
        let mut seen = BTreeSet::new();
        for item in self.events.scan_prefix(prefix).keys() {
            let key = item.context("Failed to read from database")?;
            let end = key.iter().position(|&b| b == SEP).unwrap_or(key.len());
            seen.insert(String::from_utf8_lossy(&key[..end]).into_owned());
        }
        Ok(seen.into_iter().collect())
    }

    /// Number of stored events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Number of distinct entity keys
    pub fn key_count(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    /// Appends a run record
    pub fn record_run(&self, run: &RunRecord) -> Result<()> {
        let id = self.db.generate_id().context("Failed to allocate run id")?;
        let value = bincode::serialize(run).context("Failed to serialize RunRecord")?;
        self.runs
            .insert(id.to_be_bytes().to_vec(), value)
            .context("Failed to record run")?;
        Ok(())
    }

    /// Most recently recorded run
    pub fn last_run(&self) -> Result<Option<RunRecord>> {
        match self.runs.last().context("Failed to read from database")? {
            Some((_, value)) => Ok(Some(
                bincode::deserialize(&value).context("Failed to deserialize RunRecord")?,
            )),
            None => Ok(None),
        }
    }

    /// Number of recorded runs
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Checks if database is empty (no timeline stored yet)
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Flushes all pending operations to disk
    pub fn flush(&self) -> Result<()> {
        self.db.flush().context("Failed to flush database")?;
        Ok(())
    }
}
