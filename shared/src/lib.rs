//! Shared utilities and common types for the Verigate workspace
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error response structures and error codes
//! - Utility functions (subject validation, log masking)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheBackend, CacheConfig, CodeCharset, DeliveryConfig, DeliveryProvider,
    Environment, HasherConfig, LogFormat, LoggingConfig, NamespacePolicy, VerificationConfig,
    EMAIL_VERIFY_NAMESPACE, PASSWORD_RESET_NAMESPACE,
};
pub use errors::{error_codes, ApiResult, ErrorResponse, IntoErrorResponse};
pub use utils::{masking, validation};
