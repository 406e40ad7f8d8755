//! Use case results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

/// A code was issued and queued for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeIssued {
    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Job id assigned by the delivery channel
    pub job_id: String,
}

/// Result of checking a code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeCheckOutcome {
    /// Whether the code was accepted
    pub valid: bool,
    /// Attempts left after a rejection, 0 after a success
    pub remaining_attempts: i64,
    /// Whether this rejection used up the last attempt
    pub exhausted: bool,
}

impl CodeCheckOutcome {
    pub(crate) fn accepted() -> Self {
        Self {
            valid: true,
            remaining_attempts: 0,
            exhausted: false,
        }
    }

    pub(crate) fn rejected(remaining_attempts: i64) -> Self {
        Self {
            valid: false,
            remaining_attempts,
            exhausted: false,
        }
    }

    /// Turn a rejection into the matching error
    pub fn into_result(self) -> DomainResult<()> {
        if self.valid {
            Ok(())
        } else if self.exhausted {
            Err(DomainError::AttemptsExhausted)
        } else {
            Err(DomainError::InvalidOrExpiredCode {
                remaining_attempts: Some(self.remaining_attempts),
            })
        }
    }
}
