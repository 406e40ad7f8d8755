//! Verification record entity and its key layout.
//!
//! A record lives in the backing store as three independently expiring keys:
//!
//! - `{namespace}:{subject}:code` - Argon2 hash of the active code
//! - `{namespace}:{subject}:attempts` - remaining verification attempts
//! - `{namespace}:{subject}:rate` - codes issued in the current rate window

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Identifies the outstanding record for one `(namespace, subject)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    namespace: String,
    subject: String,
}

impl RecordKey {
    /// Create a key for a namespace and subject
    pub fn new(namespace: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            subject: subject.into(),
        }
    }

    /// Namespace segment
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Subject segment
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Store key holding the code hash
    pub fn code_key(&self) -> String {
        format!("{}:{}:code", self.namespace, self.subject)
    }

    /// Store key holding the remaining attempt counter
    pub fn attempts_key(&self) -> String {
        format!("{}:{}:attempts", self.namespace, self.subject)
    }

    /// Store key holding the issuance counter of the current rate window
    pub fn rate_key(&self) -> String {
        format!("{}:{}:rate", self.namespace, self.subject)
    }
}

/// A freshly issued record, as written by `generate`
///
/// Writing a record replaces whatever was stored under the same key, which
/// is how issuing a new code invalidates the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRecord {
    /// Where the record is stored
    pub key: RecordKey,
    /// One-way hash of the plaintext code
    pub code_hash: String,
    /// Initial value of the attempt counter
    pub max_attempts: u32,
    /// Time to live of both the hash and the counter
    pub ttl: Duration,
    /// Wall-clock instant the store will drop the record
    pub expires_at: DateTime<Utc>,
}

/// A live record, as returned by a store read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    /// One-way hash of the plaintext code
    pub code_hash: String,
    /// Verification attempts left, always positive for a live record
    pub remaining_attempts: i64,
    /// Time until the store drops the record, if it reported one
    pub expires_in: Option<Duration>,
}

/// Plaintext code handed back to the caller of `generate`
///
/// This is the only value that ever carries the plaintext. Its `Debug`
/// output redacts the code.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedCode {
    /// The plaintext code to deliver out of band
    pub code: String,
    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl fmt::Debug for IssuedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCode")
            .field("code", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Externally visible state of a `(namespace, subject)` pair
///
/// Consumed, exhausted, expired and never-issued records are all `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeStatus {
    Absent,
    Active {
        remaining_attempts: i64,
        expires_in: Option<Duration>,
    },
}

impl CodeStatus {
    /// Whether a code is currently outstanding
    pub fn is_active(&self) -> bool {
        matches!(self, CodeStatus::Active { .. })
    }
}

impl From<Option<StoredRecord>> for CodeStatus {
    fn from(record: Option<StoredRecord>) -> Self {
        match record {
            Some(record) => CodeStatus::Active {
                remaining_attempts: record.remaining_attempts,
                expires_in: record.expires_in,
            },
            None => CodeStatus::Absent,
        }
    }
}
