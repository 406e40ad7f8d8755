//! Unit tests for code hashing

use vg_shared::HasherConfig;

use crate::errors::DomainError;
use crate::services::verification::SecretHasher;

fn hasher() -> SecretHasher {
    SecretHasher::new(&HasherConfig::fast()).unwrap()
}

#[test]
fn test_hash_and_match() {
    let hasher = hasher();
    let digest = hasher.hash("482913").unwrap();

    assert!(digest.starts_with("$argon2id$"));
    assert!(!digest.contains("482913"));
    assert!(hasher.matches(&digest, "482913"));
    assert!(!hasher.matches(&digest, "482914"));
}

#[test]
fn test_salts_differ_per_hash() {
    let hasher = hasher();
    let first = hasher.hash("482913").unwrap();
    let second = hasher.hash("482913").unwrap();

    assert_ne!(first, second);
    assert!(hasher.matches(&first, "482913"));
    assert!(hasher.matches(&second, "482913"));
}

#[test]
fn test_malformed_digest_never_matches() {
    let hasher = hasher();

    assert!(!hasher.matches("", "482913"));
    assert!(!hasher.matches("482913", "482913"));
    assert!(!hasher.matches("$argon2id$garbage", "482913"));
}

#[test]
fn test_digest_carries_its_parameters() {
    let digest = hasher().hash("482913").unwrap();

    // A hasher with other costs still verifies older digests
    let other = SecretHasher::new(&HasherConfig {
        memory_kib: 512,
        iterations: 2,
        parallelism: 1,
    })
    .unwrap();
    assert!(other.matches(&digest, "482913"));
}

#[test]
fn test_invalid_parameters() {
    let result = SecretHasher::new(&HasherConfig {
        memory_kib: 0,
        iterations: 0,
        parallelism: 0,
    });

    assert!(matches!(result, Err(DomainError::Internal { .. })));
}

#[tokio::test]
async fn test_async_round_trip() {
    let hasher = hasher();
    let digest = hasher.hash_async("A1B2C3".to_string()).await.unwrap();

    assert!(hasher
        .matches_async(digest.clone(), "A1B2C3".to_string())
        .await
        .unwrap());
    assert!(!hasher
        .matches_async(digest, "A1B2C4".to_string())
        .await
        .unwrap());
}
