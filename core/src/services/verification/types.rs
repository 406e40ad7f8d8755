//! Types for rate limiting, counters and check outcomes

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counter state after an increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterWindow {
    /// Value after the increment
    pub count: u64,
    /// Time until the window resets, if the store reported one
    pub resets_in: Option<Duration>,
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateLimitStatus {
    /// Request is allowed
    Ok {
        remaining: u32,
        limit: u32,
        window_seconds: u64,
    },
    /// Rate limit exceeded
    Exceeded {
        retry_after_seconds: u64,
        limit: u32,
        window_seconds: u64,
    },
}

impl RateLimitStatus {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitStatus::Ok { .. })
    }
}

/// Why a candidate code was accepted or rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOutcome {
    /// The candidate matched the outstanding code
    Matched,
    /// Wrong code; the outstanding code keeps `remaining_attempts`
    Mismatch { remaining_attempts: i64 },
    /// Wrong code that used the last attempt; the record was removed
    Exhausted,
    /// Wrong length or characters; no attempt was counted
    Malformed,
    /// Nothing to check against: never issued, expired, already used up,
    /// or replaced or consumed while this check ran
    NoActiveCode,
}

impl CheckOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, CheckOutcome::Matched)
    }
}
