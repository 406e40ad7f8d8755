//! Ports for the backing store and the code delivery channel

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::entities::{EmailTask, RecordKey, StoredRecord, VerificationRecord};
use crate::errors::DomainResult;

use super::types::CounterWindow;

/// Shared key-value store holding verification records
///
/// Every method is one atomic round trip: concurrent callers observe either
/// all of a method's effects or none of them. Connectivity loss and
/// timeouts surface as `DomainError::StoreUnavailable`.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Write the code hash and attempt counter with the same TTL,
    /// replacing any record stored under the key
    async fn atomic_write(&self, record: &VerificationRecord) -> DomainResult<()>;

    /// Read hash, attempts and remaining TTL together
    ///
    /// A missing hash or a counter at or below zero reads as `None`.
    async fn read(&self, key: &RecordKey) -> DomainResult<Option<StoredRecord>>;

    /// Remove the hash and the counter, returning whether anything existed
    async fn delete(&self, key: &RecordKey) -> DomainResult<bool>;

    /// Remove the record only while it still carries `code_hash`
    async fn delete_if_current(&self, key: &RecordKey, code_hash: &str) -> DomainResult<bool>;

    /// Remove the record only while it carries `code_hash` and has attempts
    /// left
    ///
    /// Of any number of concurrent callers at most one observes `true`.
    async fn consume(&self, key: &RecordKey, code_hash: &str) -> DomainResult<bool>;

    /// Increment a counter, starting its expiry window on the first hit
    async fn incr_with_ttl(&self, counter_key: &str, window: Duration)
        -> DomainResult<CounterWindow>;

    /// Decrement the attempt counter while the record still carries
    /// `code_hash` and the counter is above `floor`
    ///
    /// Returns the new value, the unchanged value when already at `floor`,
    /// or `None` when the record is gone or was replaced. The TTL is kept.
    async fn decr_bounded(
        &self,
        key: &RecordKey,
        code_hash: &str,
        floor: i64,
    ) -> DomainResult<Option<i64>>;

    /// Check connectivity
    async fn ping(&self) -> DomainResult<bool>;
}

/// Hands rendered tasks to whatever actually sends mail
#[async_trait]
pub trait CodeDelivery: Send + Sync {
    /// Queue a task and return its job id
    async fn deliver(&self, task: &EmailTask) -> DomainResult<String>;
}
