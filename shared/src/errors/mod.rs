//! Shared error response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error payload handed to whatever transport layer fronts the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP-equivalent status code
    pub status: u16,

    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status,
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }

    /// Whether the status is in the server error range
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// Common error codes used across the workspace
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const TOO_MANY_REQUESTS: &str = "TOO_MANY_REQUESTS";
    pub const INVALID_OR_EXPIRED_CODE: &str = "INVALID_OR_EXPIRED_CODE";
    pub const ATTEMPTS_EXHAUSTED: &str = "ATTEMPTS_EXHAUSTED";
    pub const ENTROPY_UNAVAILABLE: &str = "ENTROPY_UNAVAILABLE";
    pub const STORE_UNAVAILABLE: &str = "STORE_UNAVAILABLE";
    pub const DELIVERY_ERROR: &str = "DELIVERY_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Trait for converting errors to ErrorResponse
pub trait IntoErrorResponse {
    fn to_error_response(&self) -> ErrorResponse;
}

/// Result type with ErrorResponse as error
pub type ApiResult<T> = Result<T, ErrorResponse>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_detail() {
        let response = ErrorResponse::new(error_codes::TOO_MANY_REQUESTS, "slow down", 429)
            .add_detail("retry_after_seconds", 30);
        let details = response.details.unwrap();
        assert_eq!(details["retry_after_seconds"], serde_json::json!(30));
    }

    #[test]
    fn test_server_error_range() {
        assert!(ErrorResponse::new(error_codes::STORE_UNAVAILABLE, "down", 503).is_server_error());
        assert!(!ErrorResponse::new(error_codes::VALIDATION_ERROR, "bad", 422).is_server_error());
    }
}
