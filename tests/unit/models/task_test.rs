// Unit tests for the task wire format

use gradbridge::models::{TaskKind, TaskMessage};

#[test]
fn test_wire_format_is_compact_json() {
    let task = TaskMessage::new(TaskKind::Ingest);
    let raw = task.to_wire().unwrap();

    assert!(raw.contains("\"kind\":\"ingest\""));
    assert!(raw.contains("\"ts\":"));
    assert!(raw.contains("\"payload\":{}"));
    // Compact encoding: no separator padding.
    assert!(!raw.contains(": "));
    assert!(!raw.contains(", "));
}

#[test]
fn test_wire_round_trip() {
    let task = TaskMessage::new(TaskKind::Recompute);
    let raw = task.to_wire().unwrap();
    let parsed = TaskMessage::from_wire(&raw).unwrap();

    assert_eq!(parsed, task);
}

#[test]
fn test_timestamp_is_iso_8601() {
    let task = TaskMessage::new(TaskKind::Ingest);
    let raw = task.to_wire().unwrap();

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let ts = value["ts"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
}

#[test]
fn test_unknown_kind_is_rejected() {
    let raw = r#"{"kind":"reindex","ts":"2025-03-01T00:00:00Z","payload":{}}"#;
    assert!(TaskMessage::from_wire(raw).is_err());
}
