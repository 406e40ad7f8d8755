//! Domain entities for one-time code verification.

pub mod email_task;
pub mod request_options;
pub mod verification_record;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use email_task::{CustomEmail, EmailTask, PasswordResetEmail, VerificationEmail};
pub use request_options::{
    VerificationRequestOptions, DEFAULT_CODE_LENGTH, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW, DEFAULT_TTL, MAX_CODE_LENGTH,
    MAX_RATE_LIMIT_WINDOW, MAX_TTL, MIN_CODE_LENGTH,
};
pub use verification_record::{CodeStatus, IssuedCode, RecordKey, StoredRecord, VerificationRecord};
