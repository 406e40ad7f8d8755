//! Bounded verification attempts per outstanding code

use std::sync::Arc;

use crate::domain::entities::RecordKey;
use crate::errors::DomainResult;

use super::traits::StateStore;

/// Counts failed verifications against the code currently on record
pub struct AttemptTracker<S: StateStore + ?Sized> {
    store: Arc<S>,
}

impl<S: StateStore + ?Sized> AttemptTracker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record a failed attempt against the code hashed as `code_hash`
    ///
    /// Returns the attempts left afterwards, or `None` when the record
    /// vanished or was replaced by a newer code in the meantime. Such a
    /// record is left untouched.
    pub async fn decrement_if_mismatch(
        &self,
        key: &RecordKey,
        code_hash: &str,
    ) -> DomainResult<Option<i64>> {
        let remaining = self.store.decr_bounded(key, code_hash, 0).await?;
        Ok(remaining.map(|n| n.max(0)))
    }

    /// Attempts left on the current record, 0 when there is none
    pub async fn remaining(&self, key: &RecordKey) -> DomainResult<i64> {
        Ok(self
            .store
            .read(key)
            .await?
            .map(|record| record.remaining_attempts.max(0))
            .unwrap_or(0))
    }
}
