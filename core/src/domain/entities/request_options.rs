//! Per-call verification options

use std::time::Duration;

use vg_shared::utils::validation::{is_valid_namespace, is_valid_subject, MAX_SUBJECT_LENGTH};
use vg_shared::{CodeCharset, NamespacePolicy};

use super::verification_record::RecordKey;
use crate::errors::{DomainError, DomainResult};

/// Default code lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Default attempts per issued code
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default code length
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default issuance window
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(3600);

/// Default codes per issuance window
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 5;

/// Shortest code accepted
pub const MIN_CODE_LENGTH: usize = 4;

/// Longest code accepted
pub const MAX_CODE_LENGTH: usize = 32;

/// Longest code lifetime accepted (30 days)
pub const MAX_TTL: Duration = Duration::from_secs(30 * 24 * 3600);

/// Longest issuance window accepted (30 days)
pub const MAX_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(30 * 24 * 3600);

/// Options for a single `generate` / `verify` call
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use vg_core::VerificationRequestOptions;
///
/// let options = VerificationRequestOptions::new("email-verify", "a@b.com")
///     .with_ttl(Duration::from_secs(300))
///     .with_max_attempts(3);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequestOptions {
    pub namespace: String,
    pub subject: String,
    pub ttl: Duration,
    pub max_attempts: u32,
    pub code_length: usize,
    pub charset: CodeCharset,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u32,
}

impl VerificationRequestOptions {
    /// Options with default limits for a namespace and subject
    pub fn new(namespace: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            subject: subject.into(),
            ttl: DEFAULT_TTL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            code_length: DEFAULT_CODE_LENGTH,
            charset: CodeCharset::Numeric,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
        }
    }

    /// Options taken from a configured namespace policy
    pub fn from_policy(policy: &NamespacePolicy, subject: impl Into<String>) -> Self {
        Self {
            namespace: policy.namespace.clone(),
            subject: subject.into(),
            ttl: Duration::from_secs(policy.ttl_seconds),
            max_attempts: policy.max_attempts,
            code_length: policy.code_length,
            charset: policy.charset,
            rate_limit_window: Duration::from_secs(policy.rate_limit_window_seconds),
            rate_limit_max: policy.rate_limit_max,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    pub fn with_charset(mut self, charset: CodeCharset) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_rate_limit(mut self, window: Duration, max: u32) -> Self {
        self.rate_limit_window = window;
        self.rate_limit_max = max;
        self
    }

    /// Store key of the record these options address
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.namespace.clone(), self.subject.clone())
    }

    /// Reject options that cannot address a record or bound it
    pub fn validate(&self) -> DomainResult<()> {
        validate_key(&self.namespace, &self.subject)?;

        // Sub-millisecond values would round to a zero store TTL.
        if self.ttl.as_millis() == 0 {
            return Err(DomainError::validation("ttl must be positive"));
        }
        if self.ttl > MAX_TTL {
            return Err(DomainError::validation(format!(
                "ttl must be at most {} seconds",
                MAX_TTL.as_secs()
            )));
        }
        if self.max_attempts == 0 {
            return Err(DomainError::validation("max_attempts must be positive"));
        }
        if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&self.code_length) {
            return Err(DomainError::validation(format!(
                "code_length must be between {} and {}",
                MIN_CODE_LENGTH, MAX_CODE_LENGTH
            )));
        }
        if self.rate_limit_window.as_millis() == 0 {
            return Err(DomainError::validation("rate_limit_window must be positive"));
        }
        if self.rate_limit_window > MAX_RATE_LIMIT_WINDOW {
            return Err(DomainError::validation(format!(
                "rate_limit_window must be at most {} seconds",
                MAX_RATE_LIMIT_WINDOW.as_secs()
            )));
        }
        if self.rate_limit_max == 0 {
            return Err(DomainError::validation("rate_limit_max must be positive"));
        }

        Ok(())
    }
}

/// Validate a bare `(namespace, subject)` pair
pub(crate) fn validate_key(namespace: &str, subject: &str) -> DomainResult<()> {
    if !is_valid_namespace(namespace) {
        return Err(DomainError::validation(
            "namespace must be non-empty ASCII without ':' or whitespace",
        ));
    }
    if !is_valid_subject(subject) {
        return Err(DomainError::validation(format!(
            "subject must be non-empty and at most {} bytes",
            MAX_SUBJECT_LENGTH
        )));
    }
    Ok(())
}
