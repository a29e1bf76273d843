// Unit tests for the idempotent applicant writer and its strict coercion

use gradbridge::models::{CanonicalRecord, EnrichedRecord};
use gradbridge::storage::{coerce_score, ApplicantStore, MemoryApplicantStore};

fn record(id: i64) -> EnrichedRecord {
    EnrichedRecord {
        record: CanonicalRecord {
            id: Some(id),
            program: Some("Computer Science, Johns Hopkins University".to_string()),
            url: Some(format!("https://www.thegradcafe.com/result/{}", id)),
            status: Some("Accepted".to_string()),
            term: Some("Fall 2025".to_string()),
            gpa: Some("3.75".to_string()),
            ..CanonicalRecord::default()
        },
        llm_generated_program: Some("Computer Science".to_string()),
        llm_generated_university: Some("Johns Hopkins University".to_string()),
    }
}

#[tokio::test]
async fn test_persisting_the_same_batch_twice_writes_once() {
    let store = MemoryApplicantStore::new();
    let batch = vec![record(1), record(2), record(3)];

    let first = store.persist(&batch).await.unwrap();
    let second = store.persist(&batch).await.unwrap();

    assert_eq!(first, 3);
    assert_eq!(second, 0);
    assert_eq!(store.len().await, 3);
}

#[tokio::test]
async fn test_overlapping_batches_only_write_new_records() {
    let store = MemoryApplicantStore::new();

    store.persist(&[record(1), record(2)]).await.unwrap();
    let written = store.persist(&[record(2), record(3)]).await.unwrap();

    assert_eq!(written, 1);
    assert_eq!(store.len().await, 3);
}

#[tokio::test]
async fn test_malformed_numeric_field_fails_the_whole_batch() {
    let store = MemoryApplicantStore::new();

    let mut bad = record(2);
    bad.record.gpa = Some("invalid_gpa".to_string());
    let batch = vec![record(1), bad, record(3)];

    let result = store.persist(&batch).await;
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid numeric value for gpa"));

    // Fail-closed: nothing from the batch was committed.
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_empty_score_strings_are_null_not_errors() {
    let store = MemoryApplicantStore::new();

    let mut entry = record(5);
    entry.record.gpa = Some(String::new());
    entry.record.gre = None;

    let written = store.persist(&[entry]).await.unwrap();
    assert_eq!(written, 1);
}

#[tokio::test]
async fn test_max_ingested_id_scans_url_suffixes() {
    let store = MemoryApplicantStore::new();
    assert_eq!(store.max_ingested_id().await.unwrap(), None);

    store
        .persist(&[record(48), record(50), record(49)])
        .await
        .unwrap();

    assert_eq!(store.max_ingested_id().await.unwrap(), Some(50));
}

#[test]
fn test_coerce_score() {
    assert_eq!(coerce_score("gpa", Some("3.75")).unwrap(), Some(3.75));
    assert_eq!(coerce_score("gpa", Some("")).unwrap(), None);
    assert_eq!(coerce_score("gpa", None).unwrap(), None);
    assert!(coerce_score("gpa", Some("invalid_gpa")).is_err());
    assert!(coerce_score("gre", Some("3.7.5")).is_err());
}
