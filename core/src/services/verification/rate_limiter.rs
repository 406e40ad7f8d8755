//! Fixed-window issuance rate limiter

use std::sync::Arc;
use std::time::Duration;

use crate::errors::DomainResult;

use super::traits::StateStore;
use super::types::RateLimitStatus;

/// Caps how many codes a subject may be issued per window
///
/// The window starts at the first issuance and resets only when the
/// counter expires. Denied requests still count, so hammering the endpoint
/// does not shorten the wait.
pub struct RateLimiter<S: StateStore + ?Sized> {
    store: Arc<S>,
}

impl<S: StateStore + ?Sized> RateLimiter<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Count one issuance against `counter_key` and report whether it is allowed
    pub async fn check_and_increment(
        &self,
        counter_key: &str,
        window: Duration,
        max: u32,
    ) -> DomainResult<RateLimitStatus> {
        let counter = self.store.incr_with_ttl(counter_key, window).await?;
        let window_seconds = window.as_secs();

        if counter.count > u64::from(max) {
            // Round up so a client never retries a moment too early
            let retry_after_seconds = counter
                .resets_in
                .map(|d| d.as_millis().div_ceil(1000) as u64)
                .unwrap_or(window_seconds)
                .max(1);

            return Ok(RateLimitStatus::Exceeded {
                retry_after_seconds,
                limit: max,
                window_seconds,
            });
        }

        Ok(RateLimitStatus::Ok {
            remaining: max - counter.count as u32,
            limit: max,
            window_seconds,
        })
    }
}
