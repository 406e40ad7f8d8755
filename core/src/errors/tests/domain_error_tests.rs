//! Unit tests for domain error types

use vg_shared::errors::{error_codes, IntoErrorResponse};

use crate::errors::DomainError;

#[test]
fn test_only_store_errors_are_retryable() {
    assert!(DomainError::StoreUnavailable {
        message: "timeout".to_string()
    }
    .is_retryable());
    assert!(!DomainError::TooManyRequests {
        retry_after_seconds: 10
    }
    .is_retryable());
    assert!(!DomainError::EntropySourceUnavailable {
        message: "getrandom".to_string()
    }
    .is_retryable());
}

#[test]
fn test_status_codes() {
    assert_eq!(DomainError::validation("bad").status_code(), 422);
    assert_eq!(
        DomainError::TooManyRequests {
            retry_after_seconds: 1
        }
        .status_code(),
        429
    );
    assert_eq!(DomainError::AttemptsExhausted.status_code(), 400);
    assert_eq!(
        DomainError::StoreUnavailable {
            message: "down".to_string()
        }
        .status_code(),
        503
    );
}

#[test]
fn test_too_many_requests_response_carries_retry_after() {
    let response = DomainError::TooManyRequests {
        retry_after_seconds: 42,
    }
    .to_error_response();

    assert_eq!(response.error, error_codes::TOO_MANY_REQUESTS);
    assert_eq!(response.status, 429);
    let details = response.details.unwrap();
    assert_eq!(details["retry_after_seconds"], serde_json::json!(42));
}

#[test]
fn test_internal_errors_hide_cause() {
    let response = DomainError::StoreUnavailable {
        message: "redis://secret@host refused".to_string(),
    }
    .to_error_response();

    assert_eq!(response.error, error_codes::STORE_UNAVAILABLE);
    assert!(!response.message.contains("secret"));
    assert!(response.is_server_error());
}
