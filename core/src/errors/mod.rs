//! Domain-specific error types and error handling.
//!
//! Expected outcomes such as a rate-limit hit are ordinary values of
//! [`DomainError`], not panics. Only [`DomainError::StoreUnavailable`] is
//! worth retrying, and never for code issuance.

use thiserror::Error;
use vg_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

#[cfg(test)]
mod tests;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Too many requests. Try again in {retry_after_seconds} seconds")]
    TooManyRequests { retry_after_seconds: u64 },

    #[error("Invalid or expired verification code")]
    InvalidOrExpiredCode { remaining_attempts: Option<i64> },

    #[error("Maximum verification attempts exceeded. Please request a new code")]
    AttemptsExhausted,

    #[error("Secure random source unavailable: {message}")]
    EntropySourceUnavailable { message: String },

    #[error("State store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Code delivery failed: {message}")]
    Delivery { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Whether the failed call may be retried as-is
    ///
    /// Only reads should act on this. `generate` must not be retried blindly,
    /// a replay can count twice against the rate limit.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::StoreUnavailable { .. })
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
            DomainError::TooManyRequests { .. } => error_codes::TOO_MANY_REQUESTS,
            DomainError::InvalidOrExpiredCode { .. } => error_codes::INVALID_OR_EXPIRED_CODE,
            DomainError::AttemptsExhausted => error_codes::ATTEMPTS_EXHAUSTED,
            DomainError::EntropySourceUnavailable { .. } => error_codes::ENTROPY_UNAVAILABLE,
            DomainError::StoreUnavailable { .. } => error_codes::STORE_UNAVAILABLE,
            DomainError::Delivery { .. } => error_codes::DELIVERY_ERROR,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
        }
    }

    /// HTTP-equivalent status code
    pub fn status_code(&self) -> u16 {
        match self {
            DomainError::Validation { .. } => 422,
            DomainError::TooManyRequests { .. } => 429,
            DomainError::InvalidOrExpiredCode { .. } | DomainError::AttemptsExhausted => 400,
            DomainError::StoreUnavailable { .. } | DomainError::Delivery { .. } => 503,
            DomainError::EntropySourceUnavailable { .. } | DomainError::Internal { .. } => 500,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation {
            message: message.into(),
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        // Server-side failures keep their cause out of the client payload.
        let message = match self {
            DomainError::StoreUnavailable { .. }
            | DomainError::EntropySourceUnavailable { .. }
            | DomainError::Internal { .. } => "Service temporarily unavailable".to_string(),
            other => other.to_string(),
        };
        let response = ErrorResponse::new(self.error_code(), message, self.status_code());

        match self {
            DomainError::TooManyRequests {
                retry_after_seconds,
            } => response.add_detail("retry_after_seconds", retry_after_seconds),
            DomainError::InvalidOrExpiredCode {
                remaining_attempts: Some(remaining),
            } => response.add_detail("remaining_attempts", remaining),
            _ => response,
        }
    }
}
