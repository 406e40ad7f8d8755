//! Verification service module for one-time codes
//!
//! This module provides the complete code workflow:
//! - Secure code generation and Argon2id hashing
//! - Fixed-window issuance rate limiting
//! - Bounded verification attempts per outstanding code
//! - One-time consumption on a shared key-value store

mod attempt_tracker;
mod generator;
mod hasher;
mod rate_limiter;
mod service;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use attempt_tracker::AttemptTracker;
pub use generator::CodeGenerator;
pub use hasher::SecretHasher;
pub use rate_limiter::RateLimiter;
pub use service::VerificationService;
pub use traits::{CodeDelivery, StateStore};
pub use types::{CheckOutcome, CounterWindow, RateLimitStatus};
