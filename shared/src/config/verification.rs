//! Verification policy configuration
//!
//! Each use case (email verification, password reset) gets its own
//! [`NamespacePolicy`]. The defaults mirror what the product ships with:
//! six-digit codes, five attempts per code, and a per-subject issuance cap.

use serde::{Deserialize, Serialize};

/// Namespace used for email address verification codes
pub const EMAIL_VERIFY_NAMESPACE: &str = "email-verify";

/// Namespace used for password reset codes
pub const PASSWORD_RESET_NAMESPACE: &str = "password-reset";

/// Character set of generated codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeCharset {
    /// Digits only, zero padded to the configured length
    Numeric,
    /// Digits and upper-case ASCII letters
    Alphanumeric,
}

impl Default for CodeCharset {
    fn default() -> Self {
        CodeCharset::Numeric
    }
}

/// Code policy for one namespace
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NamespacePolicy {
    /// Namespace the policy applies to
    pub namespace: String,

    /// Seconds before an issued code expires
    pub ttl_seconds: u64,

    /// Verification attempts allowed per issued code
    pub max_attempts: u32,

    /// Number of characters in a generated code
    pub code_length: usize,

    /// Character set of generated codes
    #[serde(default)]
    pub charset: CodeCharset,

    /// Length of the issuance counting window in seconds
    pub rate_limit_window_seconds: u64,

    /// Codes that may be issued per subject within one window
    pub rate_limit_max: u32,
}

impl NamespacePolicy {
    /// Default policy for email verification
    pub fn email_verify() -> Self {
        Self {
            namespace: EMAIL_VERIFY_NAMESPACE.to_string(),
            ttl_seconds: 600,
            max_attempts: 5,
            code_length: 6,
            charset: CodeCharset::Numeric,
            rate_limit_window_seconds: 3600,
            rate_limit_max: 5,
        }
    }

    /// Default policy for password reset
    pub fn password_reset() -> Self {
        Self {
            namespace: PASSWORD_RESET_NAMESPACE.to_string(),
            ttl_seconds: 3600,
            max_attempts: 5,
            code_length: 6,
            charset: CodeCharset::Numeric,
            rate_limit_window_seconds: 86_400,
            rate_limit_max: 3,
        }
    }
}

/// Argon2id cost parameters for code hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct HasherConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        // OWASP: Argon2id with m=19456, t=2, p=1
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HasherConfig {
    /// Cheap parameters for unit and integration tests
    pub fn fast() -> Self {
        Self {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Verification service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Email verification policy
    pub email_verify: NamespacePolicy,

    /// Password reset policy
    pub password_reset: NamespacePolicy,

    /// Hashing cost
    pub hasher: HasherConfig,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            email_verify: NamespacePolicy::email_verify(),
            password_reset: NamespacePolicy::password_reset(),
            hasher: HasherConfig::default(),
        }
    }
}
