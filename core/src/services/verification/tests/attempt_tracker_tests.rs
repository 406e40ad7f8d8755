//! Unit tests for attempt tracking

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{RecordKey, VerificationRecord};
use crate::services::verification::{AttemptTracker, StateStore};

use super::mocks::MockStateStore;

fn record(key: &RecordKey, code_hash: &str, max_attempts: u32) -> VerificationRecord {
    VerificationRecord {
        key: key.clone(),
        code_hash: code_hash.to_string(),
        max_attempts,
        ttl: Duration::from_secs(600),
        expires_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_decrement_until_exhausted() {
    let store = Arc::new(MockStateStore::new());
    let tracker = AttemptTracker::new(store.clone());
    let key = RecordKey::new("email-verify", "a@b.com");
    store.atomic_write(&record(&key, "hash-1", 3)).await.unwrap();

    assert_eq!(tracker.remaining(&key).await.unwrap(), 3);
    assert_eq!(tracker.decrement_if_mismatch(&key, "hash-1").await.unwrap(), Some(2));
    assert_eq!(tracker.decrement_if_mismatch(&key, "hash-1").await.unwrap(), Some(1));
    assert_eq!(tracker.decrement_if_mismatch(&key, "hash-1").await.unwrap(), Some(0));

    // Never below zero
    assert_eq!(tracker.decrement_if_mismatch(&key, "hash-1").await.unwrap(), Some(0));
    assert_eq!(store.raw_attempts(&key), Some(0));
    assert_eq!(tracker.remaining(&key).await.unwrap(), 0);
}

#[tokio::test]
async fn test_superseded_record_is_untouched() {
    let store = Arc::new(MockStateStore::new());
    let tracker = AttemptTracker::new(store.clone());
    let key = RecordKey::new("email-verify", "a@b.com");
    store.atomic_write(&record(&key, "hash-2", 5)).await.unwrap();

    // A guess checked against the previous code must not burn the new one
    assert_eq!(tracker.decrement_if_mismatch(&key, "hash-1").await.unwrap(), None);
    assert_eq!(tracker.remaining(&key).await.unwrap(), 5);
}

#[tokio::test]
async fn test_absent_record_reports_nothing() {
    let tracker = AttemptTracker::new(Arc::new(MockStateStore::new()));
    let key = RecordKey::new("email-verify", "nobody@b.com");

    assert_eq!(tracker.remaining(&key).await.unwrap(), 0);
    assert_eq!(tracker.decrement_if_mismatch(&key, "hash").await.unwrap(), None);
}
