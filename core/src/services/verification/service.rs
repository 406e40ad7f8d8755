//! Main verification service implementation

use chrono::Utc;
use std::sync::Arc;
use vg_shared::utils::masking::mask_subject;
use vg_shared::VerificationConfig;

use crate::domain::entities::request_options::validate_key;
use crate::domain::entities::{
    CodeStatus, IssuedCode, RecordKey, VerificationRecord, VerificationRequestOptions,
};
use crate::errors::{DomainError, DomainResult};

use super::attempt_tracker::AttemptTracker;
use super::generator::CodeGenerator;
use super::hasher::SecretHasher;
use super::rate_limiter::RateLimiter;
use super::traits::StateStore;
use super::types::{CheckOutcome, RateLimitStatus};

/// Issues and checks one-time codes on a shared [`StateStore`]
///
/// The service keeps no mutable state of its own. Every decision is made
/// from one atomic store round trip, so any number of instances may run
/// against the same store.
pub struct VerificationService<S: StateStore + ?Sized> {
    /// Backing store shared by all instances
    store: Arc<S>,
    /// Code hasher
    hasher: SecretHasher,
    /// Issuance cap per subject
    rate_limiter: RateLimiter<S>,
    /// Failed attempt accounting
    attempt_tracker: AttemptTracker<S>,
}

impl<S: StateStore + ?Sized> VerificationService<S> {
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `store` - State store implementation
    /// * `hasher` - Code hasher
    pub fn new(store: Arc<S>, hasher: SecretHasher) -> Self {
        Self {
            rate_limiter: RateLimiter::new(Arc::clone(&store)),
            attempt_tracker: AttemptTracker::new(Arc::clone(&store)),
            store,
            hasher,
        }
    }

    /// Create a service whose hasher uses the configured cost parameters
    pub fn from_config(store: Arc<S>, config: &VerificationConfig) -> DomainResult<Self> {
        Ok(Self::new(store, SecretHasher::new(&config.hasher)?))
    }

    /// Issue a new code for `(namespace, subject)`
    ///
    /// This method:
    /// 1. Counts the request against the subject's issuance window
    /// 2. Generates a code from the OS random source
    /// 3. Stores its hash and a fresh attempt counter, replacing any
    ///    outstanding code
    ///
    /// A denied request changes nothing but the issuance counter. The call
    /// must not be retried blindly: a replay counts against the limit again.
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedCode)` - The plaintext code and its expiry
    /// * `Err(DomainError::TooManyRequests)` - The issuance window is full
    /// * `Err(DomainError)` - Invalid options or an unavailable store or
    ///   random source
    pub async fn generate(&self, options: &VerificationRequestOptions) -> DomainResult<IssuedCode> {
        options.validate()?;
        let key = options.key();
        let ttl = chrono::Duration::from_std(options.ttl)
            .map_err(|_| DomainError::validation("ttl is out of range"))?;

        let status = self
            .rate_limiter
            .check_and_increment(&key.rate_key(), options.rate_limit_window, options.rate_limit_max)
            .await?;

        if let RateLimitStatus::Exceeded {
            retry_after_seconds,
            limit,
            ..
        } = status
        {
            tracing::warn!(
                namespace = %key.namespace(),
                subject = %mask_subject(key.subject()),
                limit = limit,
                retry_after_seconds = retry_after_seconds,
                event = "rate_limit_exceeded",
                "Verification code issuance rate limit exceeded"
            );
            return Err(DomainError::TooManyRequests {
                retry_after_seconds,
            });
        }

        let code = CodeGenerator::generate(options.code_length, options.charset)?;
        let code_hash = self.hasher.hash_async(code.clone()).await?;

        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| DomainError::validation("ttl is out of range"))?;

        self.store
            .atomic_write(&VerificationRecord {
                key: key.clone(),
                code_hash,
                max_attempts: options.max_attempts,
                ttl: options.ttl,
                expires_at,
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    namespace = %key.namespace(),
                    subject = %mask_subject(key.subject()),
                    error = %e,
                    event = "otp_storage_failed",
                    "Failed to store verification code"
                );
                e
            })?;

        tracing::info!(
            namespace = %key.namespace(),
            subject = %mask_subject(key.subject()),
            expires_at = %expires_at,
            event = "otp_generated",
            "Generated new verification code"
        );

        Ok(IssuedCode { code, expires_at })
    }

    /// Check a candidate code without consuming it
    ///
    /// A mismatch costs one attempt; the attempt that brings the counter to
    /// zero deletes the record. Wrong, expired, exhausted and never-issued
    /// codes all return `false`.
    pub async fn verify(
        &self,
        options: &VerificationRequestOptions,
        candidate: &str,
    ) -> DomainResult<bool> {
        Ok(self.verify_detailed(options, candidate).await?.is_match())
    }

    /// Check a candidate code and consume it on a match
    ///
    /// Of any number of concurrent calls with the right code, exactly one
    /// returns `true`. Later calls find no record and return `false`.
    pub async fn verify_and_consume(
        &self,
        options: &VerificationRequestOptions,
        candidate: &str,
    ) -> DomainResult<bool> {
        Ok(self
            .verify_and_consume_detailed(options, candidate)
            .await?
            .is_match())
    }

    /// [`verify`](Self::verify), reporting why a candidate was rejected
    pub async fn verify_detailed(
        &self,
        options: &VerificationRequestOptions,
        candidate: &str,
    ) -> DomainResult<CheckOutcome> {
        let key = options.key();
        let outcome = match self.check(options, &key, candidate).await? {
            Checked::Matched(_) => CheckOutcome::Matched,
            Checked::Rejected(outcome) => return Ok(outcome),
        };

        tracing::info!(
            namespace = %key.namespace(),
            subject = %mask_subject(key.subject()),
            event = "otp_verified_success",
            "Verification code successfully verified"
        );

        Ok(outcome)
    }

    /// [`verify_and_consume`](Self::verify_and_consume), reporting why a
    /// candidate was rejected
    ///
    /// Losing a consume race to another caller reports
    /// [`CheckOutcome::NoActiveCode`].
    pub async fn verify_and_consume_detailed(
        &self,
        options: &VerificationRequestOptions,
        candidate: &str,
    ) -> DomainResult<CheckOutcome> {
        let key = options.key();
        let code_hash = match self.check(options, &key, candidate).await? {
            Checked::Matched(code_hash) => code_hash,
            Checked::Rejected(outcome) => return Ok(outcome),
        };

        if self.store.consume(&key, &code_hash).await? {
            tracing::info!(
                namespace = %key.namespace(),
                subject = %mask_subject(key.subject()),
                event = "otp_consumed",
                "Verification code verified and consumed"
            );
            Ok(CheckOutcome::Matched)
        } else {
            tracing::debug!(
                namespace = %key.namespace(),
                subject = %mask_subject(key.subject()),
                "Verification code consumed concurrently"
            );
            Ok(CheckOutcome::NoActiveCode)
        }
    }

    /// Attempts left on the outstanding code
    ///
    /// Returns 0 both when no code is outstanding and when the code has no
    /// attempts left.
    pub async fn get_remaining_attempts(&self, namespace: &str, subject: &str) -> DomainResult<i64> {
        validate_key(namespace, subject)?;
        self.attempt_tracker
            .remaining(&RecordKey::new(namespace, subject))
            .await
    }

    /// Like [`get_remaining_attempts`](Self::get_remaining_attempts), but
    /// fails with [`DomainError::AttemptsExhausted`] when none are left
    pub async fn ensure_attempts_remaining(&self, namespace: &str, subject: &str) -> DomainResult<i64> {
        match self.get_remaining_attempts(namespace, subject).await? {
            0 => Err(DomainError::AttemptsExhausted),
            remaining => Ok(remaining),
        }
    }

    /// Invalidate the outstanding code, if any
    ///
    /// The issuance counter is left alone, so revoking does not reset the
    /// rate limit.
    pub async fn revoke(&self, namespace: &str, subject: &str) -> DomainResult<bool> {
        validate_key(namespace, subject)?;
        let key = RecordKey::new(namespace, subject);
        let removed = self.store.delete(&key).await?;

        tracing::info!(
            namespace = %key.namespace(),
            subject = %mask_subject(key.subject()),
            removed = removed,
            event = "otp_revoked",
            "Verification code revoked"
        );

        Ok(removed)
    }

    /// Current state of `(namespace, subject)`
    pub async fn status(&self, namespace: &str, subject: &str) -> DomainResult<CodeStatus> {
        validate_key(namespace, subject)?;
        let record = self.store.read(&RecordKey::new(namespace, subject)).await?;
        Ok(CodeStatus::from(record))
    }

    /// Check that the backing store is reachable
    pub async fn health_check(&self) -> DomainResult<bool> {
        self.store.ping().await
    }

    /// Compare `candidate` with the outstanding code
    ///
    /// A mismatch is counted against the record it was compared with.
    async fn check(
        &self,
        options: &VerificationRequestOptions,
        key: &RecordKey,
        candidate: &str,
    ) -> DomainResult<Checked> {
        options.validate()?;

        let candidate = CodeGenerator::normalize(candidate, options.charset);
        if !CodeGenerator::is_well_formed(&candidate, options.code_length, options.charset) {
            tracing::warn!(
                namespace = %key.namespace(),
                subject = %mask_subject(key.subject()),
                code_length = candidate.len(),
                event = "invalid_code_format",
                "Invalid verification code format provided"
            );
            return Ok(Checked::Rejected(CheckOutcome::Malformed));
        }

        let record = match self.store.read(key).await? {
            Some(record) => record,
            None => {
                tracing::debug!(
                    namespace = %key.namespace(),
                    subject = %mask_subject(key.subject()),
                    "No outstanding verification code"
                );
                return Ok(Checked::Rejected(CheckOutcome::NoActiveCode));
            }
        };

        if self
            .hasher
            .matches_async(record.code_hash.clone(), candidate)
            .await?
        {
            return Ok(Checked::Matched(record.code_hash));
        }

        let outcome = match self
            .attempt_tracker
            .decrement_if_mismatch(key, &record.code_hash)
            .await?
        {
            None => {
                tracing::debug!(
                    namespace = %key.namespace(),
                    subject = %mask_subject(key.subject()),
                    "Verification code replaced or removed during check"
                );
                CheckOutcome::NoActiveCode
            }
            Some(0) => {
                // Exhausted records are unusable; drop them now rather than at TTL.
                self.store
                    .delete_if_current(key, &record.code_hash)
                    .await?;
                tracing::error!(
                    namespace = %key.namespace(),
                    subject = %mask_subject(key.subject()),
                    event = "max_attempts_exceeded",
                    "Maximum verification attempts exceeded"
                );
                CheckOutcome::Exhausted
            }
            Some(remaining_attempts) => {
                tracing::warn!(
                    namespace = %key.namespace(),
                    subject = %mask_subject(key.subject()),
                    remaining_attempts = remaining_attempts,
                    event = "otp_verification_failed",
                    "Verification code verification failed"
                );
                CheckOutcome::Mismatch { remaining_attempts }
            }
        };

        Ok(Checked::Rejected(outcome))
    }
}

/// Result of comparing a candidate, before any consumption
enum Checked {
    /// Carries the hash of the matching record
    Matched(String),
    Rejected(CheckOutcome),
}
