//! Unit tests for the issuance rate limiter

use std::sync::Arc;
use std::time::Duration;

use crate::services::verification::{RateLimitStatus, RateLimiter};

use super::mocks::MockStateStore;

const WINDOW: Duration = Duration::from_secs(60);

#[tokio::test(start_paused = true)]
async fn test_allows_up_to_limit() {
    let limiter = RateLimiter::new(Arc::new(MockStateStore::new()));

    let first = limiter.check_and_increment("ns:a@b.com:rate", WINDOW, 2).await.unwrap();
    assert_eq!(
        first,
        RateLimitStatus::Ok {
            remaining: 1,
            limit: 2,
            window_seconds: 60,
        }
    );

    let second = limiter.check_and_increment("ns:a@b.com:rate", WINDOW, 2).await.unwrap();
    assert_eq!(
        second,
        RateLimitStatus::Ok {
            remaining: 0,
            limit: 2,
            window_seconds: 60,
        }
    );

    let third = limiter.check_and_increment("ns:a@b.com:rate", WINDOW, 2).await.unwrap();
    assert!(!third.is_allowed());
    match third {
        RateLimitStatus::Exceeded {
            retry_after_seconds,
            limit,
            ..
        } => {
            assert_eq!(limit, 2);
            assert_eq!(retry_after_seconds, 60);
        }
        other => panic!("Expected exceeded, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_counts_down() {
    let limiter = RateLimiter::new(Arc::new(MockStateStore::new()));

    limiter.check_and_increment("k", WINDOW, 1).await.unwrap();
    tokio::time::advance(Duration::from_millis(45_500)).await;

    match limiter.check_and_increment("k", WINDOW, 1).await.unwrap() {
        RateLimitStatus::Exceeded {
            retry_after_seconds,
            ..
        } => assert_eq!(retry_after_seconds, 15),
        other => panic!("Expected exceeded, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_window_resets_after_expiry() {
    let limiter = RateLimiter::new(Arc::new(MockStateStore::new()));

    assert!(limiter.check_and_increment("k", WINDOW, 1).await.unwrap().is_allowed());
    assert!(!limiter.check_and_increment("k", WINDOW, 1).await.unwrap().is_allowed());

    tokio::time::advance(WINDOW + Duration::from_secs(1)).await;

    assert!(limiter.check_and_increment("k", WINDOW, 1).await.unwrap().is_allowed());
}

#[tokio::test(start_paused = true)]
async fn test_keys_are_independent() {
    let limiter = RateLimiter::new(Arc::new(MockStateStore::new()));

    assert!(limiter.check_and_increment("email-verify:a@b.com:rate", WINDOW, 1).await.unwrap().is_allowed());
    assert!(limiter.check_and_increment("password-reset:a@b.com:rate", WINDOW, 1).await.unwrap().is_allowed());
    assert!(limiter.check_and_increment("email-verify:c@d.com:rate", WINDOW, 1).await.unwrap().is_allowed());
}
