//! Unit tests for verification request options

use std::time::Duration;

use vg_shared::{CodeCharset, NamespacePolicy};

use crate::domain::entities::request_options::{
    VerificationRequestOptions, DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS, MAX_CODE_LENGTH,
    MAX_RATE_LIMIT_WINDOW, MAX_TTL, MIN_CODE_LENGTH,
};
use crate::errors::DomainError;

fn assert_validation_error(options: VerificationRequestOptions) {
    match options.validate() {
        Err(DomainError::Validation { .. }) => {}
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[test]
fn test_defaults_are_valid() {
    let options = VerificationRequestOptions::new("email-verify", "a@b.com");

    assert_eq!(options.code_length, DEFAULT_CODE_LENGTH);
    assert_eq!(options.max_attempts, DEFAULT_MAX_ATTEMPTS);
    assert_eq!(options.charset, CodeCharset::Numeric);
    assert!(options.validate().is_ok());
}

#[test]
fn test_from_policy() {
    let policy = NamespacePolicy::password_reset();
    let options = VerificationRequestOptions::from_policy(&policy, "a@b.com");

    assert_eq!(options.namespace, "password-reset");
    assert_eq!(options.ttl, Duration::from_secs(3600));
    assert_eq!(options.rate_limit_window, Duration::from_secs(86_400));
    assert_eq!(options.rate_limit_max, 3);
    assert_eq!(options.key().code_key(), "password-reset:a@b.com:code");
}

#[test]
fn test_builders() {
    let options = VerificationRequestOptions::new("invite", "user-42")
        .with_ttl(Duration::from_secs(30))
        .with_max_attempts(1)
        .with_code_length(10)
        .with_charset(CodeCharset::Alphanumeric)
        .with_rate_limit(Duration::from_secs(60), 2);

    assert_eq!(options.ttl, Duration::from_secs(30));
    assert_eq!(options.max_attempts, 1);
    assert_eq!(options.code_length, 10);
    assert_eq!(options.charset, CodeCharset::Alphanumeric);
    assert_eq!(options.rate_limit_window, Duration::from_secs(60));
    assert_eq!(options.rate_limit_max, 2);
    assert!(options.validate().is_ok());
}

#[test]
fn test_invalid_namespace() {
    assert_validation_error(VerificationRequestOptions::new("", "a@b.com"));
    assert_validation_error(VerificationRequestOptions::new("email:verify", "a@b.com"));
    assert_validation_error(VerificationRequestOptions::new("email verify", "a@b.com"));
}

#[test]
fn test_invalid_subject() {
    assert_validation_error(VerificationRequestOptions::new("email-verify", ""));
    assert_validation_error(VerificationRequestOptions::new("email-verify", "   "));
    assert_validation_error(VerificationRequestOptions::new(
        "email-verify",
        "x".repeat(321),
    ));
}

#[test]
fn test_invalid_limits() {
    let base = VerificationRequestOptions::new("email-verify", "a@b.com");

    assert_validation_error(base.clone().with_ttl(Duration::ZERO));
    assert_validation_error(base.clone().with_max_attempts(0));
    assert_validation_error(base.clone().with_code_length(MIN_CODE_LENGTH - 1));
    assert_validation_error(base.clone().with_code_length(MAX_CODE_LENGTH + 1));
    assert_validation_error(base.clone().with_rate_limit(Duration::ZERO, 5));
    assert_validation_error(base.with_rate_limit(Duration::from_secs(60), 0));
}

#[test]
fn test_code_length_bounds_are_inclusive() {
    let base = VerificationRequestOptions::new("email-verify", "a@b.com");

    assert!(base.clone().with_code_length(MIN_CODE_LENGTH).validate().is_ok());
    assert!(base.with_code_length(MAX_CODE_LENGTH).validate().is_ok());
}

#[test]
fn test_duration_upper_bounds() {
    let base = VerificationRequestOptions::new("email-verify", "a@b.com");

    assert!(base.clone().with_ttl(MAX_TTL).validate().is_ok());
    assert!(base
        .clone()
        .with_rate_limit(MAX_RATE_LIMIT_WINDOW, 5)
        .validate()
        .is_ok());

    assert_validation_error(base.clone().with_ttl(MAX_TTL + Duration::from_secs(1)));
    assert_validation_error(base.clone().with_ttl(Duration::MAX));
    assert_validation_error(
        base.clone()
            .with_ttl(Duration::from_secs(1_000_000_000_000_000)),
    );
    assert_validation_error(base.with_rate_limit(Duration::MAX, 5));
}
