//! Tests for the change-set reduction

use history_core::{
    reduce, ChangeSetReducer, Commit, ContractExtractor, Document, EntityExtractor, EntityFields,
    EntitySnapshot, Fingerprint,
};
use serde_json::json;

// ── fixtures ─────────────────────────────────────────────────────────────────

fn commit(n: i64) -> Commit {
    Commit::new(format!("{:040x}", n), 1_600_000_000 + n * 60)
}

fn snap(key: &str, state: &str, n: i64) -> EntitySnapshot {
    let mut fields = EntityFields::new();
    fields.insert("state".to_string(), json!(state));
    EntitySnapshot::new(key, fields, commit(n))
}

fn contracts_doc(heartbeat: &str) -> Document {
    Document::from_value(json!({
        "contracts": {
            "0xabc": {
                "name": "ETH / USD",
                "status": "live",
                "decimals": 8,
                "heartbeat": heartbeat,
                "billing": {"maxGasPriceGwei": 1000}
            }
        }
    }))
}

// ── run collapsing ───────────────────────────────────────────────────────────

#[test]
fn test_aabbc_keeps_last_of_run_and_final() {
    let events = reduce(vec![
        snap("feed", "A", 0),
        snap("feed", "A", 1),
        snap("feed", "B", 2),
        snap("feed", "B", 3),
        snap("feed", "C", 4),
    ])
    .unwrap();

    let kept: Vec<(i64, &str)> = events
        .iter()
        .map(|e| (e.commit.timestamp, e.fields["state"].as_str().unwrap()))
        .collect();
    assert_eq!(
        kept,
        vec![(commit(1).timestamp, "A"), (commit(3).timestamp, "B"), (commit(4).timestamp, "C")]
    );
}

#[test]
fn test_single_observation_yields_single_event() {
    let events = reduce(vec![snap("feed", "A", 7)]).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].commit, commit(7));
}

#[test]
fn test_unchanged_key_keeps_only_final_snapshot() {
    let events = reduce((0..5).map(|n| snap("feed", "A", n))).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].commit, commit(4));
}

#[test]
fn test_state_returning_to_earlier_value_is_a_new_run() {
    let events = reduce(vec![snap("feed", "A", 0), snap("feed", "B", 1), snap("feed", "A", 2)]).unwrap();
    assert_eq!(events.len(), 3);
}

#[test]
fn test_event_fingerprint_differs_from_next_snapshot() {
    let snapshots = vec![
        snap("feed", "A", 0),
        snap("feed", "A", 1),
        snap("feed", "B", 2),
        snap("feed", "C", 3),
        snap("feed", "C", 4),
    ];
    let events = reduce(snapshots.clone()).unwrap();

    for event in &events {
        let next = snapshots
            .iter()
            .find(|s| s.commit.timestamp > event.commit.timestamp);
        if let Some(next) = next {
            assert_ne!(event.fingerprint, Fingerprint::of(&next.fields).unwrap());
        }
    }
}

// ── grouping and ordering ────────────────────────────────────────────────────

#[test]
fn test_keys_with_identical_content_do_not_collide() {
    let events = reduce(vec![snap("b", "A", 0), snap("a", "A", 0), snap("a", "A", 1)]).unwrap();
    let keys: Vec<&str> = events.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn test_output_sorted_by_key_then_time() {
    let mut reducer = ChangeSetReducer::new();
    reducer.push(snap("z", "B", 3));
    reducer.push(snap("a", "B", 2));
    reducer.push(snap("z", "A", 1));
    reducer.push(snap("a", "A", 0));

    let order: Vec<(String, i64)> = reducer
        .finish()
        .unwrap()
        .into_iter()
        .map(|e| (e.key, e.commit.timestamp))
        .collect();
    assert_eq!(
        order,
        vec![
            ("a".to_string(), commit(0).timestamp),
            ("a".to_string(), commit(2).timestamp),
            ("z".to_string(), commit(1).timestamp),
            ("z".to_string(), commit(3).timestamp),
        ]
    );
}

// ── end to end with the contracts schema ─────────────────────────────────────

#[test]
fn test_three_commits_repeat_then_change() {
    let extractor = ContractExtractor;
    let docs = [contracts_doc("3600s"), contracts_doc("3600s"), contracts_doc("600s")];

    let snapshots: Vec<EntitySnapshot> = docs
        .iter()
        .enumerate()
        .flat_map(|(n, doc)| extractor.extract(doc, &commit(n as i64 + 1)))
        .collect();
    assert_eq!(snapshots.len(), 3);

    let events = reduce(snapshots).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].commit, commit(2));
    assert_eq!(events[0].fields["heartbeat"], json!("3600s"));
    assert_eq!(events[1].commit, commit(3));
    assert_eq!(events[1].fields["heartbeat"], json!("600s"));
}
