use formstack_types::{Error, RecordId};
use std::collections::HashSet;
use std::str::FromStr;

// ── RecordId ──────────────────────────────────────────────────────

#[test]
fn record_id_new_is_unique() {
    let a = RecordId::new();
    let b = RecordId::new();
    assert_ne!(a, b);
}

#[test]
fn record_id_parse_ignores_surrounding_whitespace() {
    let id = RecordId::new();
    let parsed = RecordId::parse(&format!("  {id}\n")).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn record_id_display_and_parse() {
    let id = RecordId::new();
    let parsed = RecordId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn record_id_from_str() {
    let id = RecordId::new();
    let parsed = RecordId::from_str(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn record_id_parse_invalid() {
    match RecordId::parse("not-a-uuid") {
        Err(Error::InvalidRecordId { input, .. }) => assert_eq!(input, "not-a-uuid"),
        other => panic!("expected InvalidRecordId, got {other:?}"),
    }
    assert!(RecordId::from_str("").is_err());
}

#[test]
fn record_id_hash_and_eq() {
    let id = RecordId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

#[test]
fn record_ids_sort_by_creation() {
    let first = RecordId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = RecordId::new();
    assert!(first < second);
}

#[test]
fn record_id_serializes_as_plain_string() {
    let id = RecordId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let back: RecordId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
