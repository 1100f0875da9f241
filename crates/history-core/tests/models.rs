//! Tests for core data models

use history_core::{ChangeEvent, Commit, EntityFields, Fingerprint};
use serde_json::json;

// ── fixtures ─────────────────────────────────────────────────────────────────

const SHA: &str = "abc1234567890abcdef01234567890abcdef0123";

fn event(pairs: &[(&str, serde_json::Value)]) -> ChangeEvent {
    let fields: EntityFields = pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    ChangeEvent {
        key: "0xfeed".to_string(),
        fingerprint: Fingerprint::of(&fields).unwrap(),
        fields,
        commit: Commit::new(SHA, 1234567890),
    }
}

// ── changed_fields ───────────────────────────────────────────────────────────

#[test]
fn test_changed_fields_reports_modified_values() {
    let before = event(&[("heartbeat", json!("3600s")), ("decimals", json!(8))]);
    let after = event(&[("heartbeat", json!("600s")), ("decimals", json!(8))]);
    assert_eq!(after.changed_fields(&before), vec!["heartbeat".to_string()]);
}

#[test]
fn test_changed_fields_reports_added_and_removed() {
    let before = event(&[("status", json!("live")), ("payment", json!("1"))]);
    let after = event(&[("status", json!("live")), ("decimals", json!(8))]);
    assert_eq!(
        after.changed_fields(&before),
        vec!["decimals".to_string(), "payment".to_string()]
    );
}

#[test]
fn test_changed_fields_empty_for_identical_state() {
    let a = event(&[("status", json!("live"))]);
    assert!(a.changed_fields(&a.clone()).is_empty());
}

// ── display ──────────────────────────────────────────────────────────────────

#[test]
fn test_display_contains_key_short_sha_and_fingerprint() {
    let e = event(&[("status", json!("live"))]);
    let s = e.to_string();
    assert!(s.contains("0xfeed"));
    // Display uses first 8 chars of commit SHA
    assert!(s.contains("abc12345"));
    assert!(s.contains(e.fingerprint.short()));
}

// ── serde ────────────────────────────────────────────────────────────────────

#[test]
fn test_fingerprint_serializes_as_plain_string() {
    let e = event(&[("status", json!("live"))]);
    let value = serde_json::to_value(&e).unwrap();
    assert_eq!(value["fingerprint"], json!(e.fingerprint.as_str()));
    assert_eq!(value["commit"]["sha"], json!(SHA));
}
