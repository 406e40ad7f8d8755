//! Email tasks handed to the mail worker
//!
//! Tasks are serialized as JSON with an `email_type` tag, the format the
//! mail worker consumes from its queue.

use serde::{Deserialize, Serialize};
use vg_shared::utils::validation::is_valid_email;

use crate::errors::{DomainError, DomainResult};

/// Longest subject line of a custom email
pub const MAX_CUSTOM_SUBJECT_LENGTH: usize = 200;

/// Verification code email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEmail {
    pub to: String,
    pub verification_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub expiry_minutes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

/// Password reset code email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResetEmail {
    pub to: String,
    pub reset_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub expiry_minutes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// Free-form email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEmail {
    pub to: String,
    pub subject: String,
    pub html_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

/// A unit of work for the mail worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "email_type", rename_all = "snake_case")]
pub enum EmailTask {
    Verification(VerificationEmail),
    PasswordReset(PasswordResetEmail),
    Custom(CustomEmail),
}

impl EmailTask {
    /// Recipient address
    pub fn recipient(&self) -> &str {
        match self {
            EmailTask::Verification(task) => &task.to,
            EmailTask::PasswordReset(task) => &task.to,
            EmailTask::Custom(task) => &task.to,
        }
    }

    /// Value of the `email_type` tag
    pub fn email_type(&self) -> &'static str {
        match self {
            EmailTask::Verification(_) => "verification",
            EmailTask::PasswordReset(_) => "password_reset",
            EmailTask::Custom(_) => "custom",
        }
    }

    /// Check the task before it is queued
    pub fn validate(&self) -> DomainResult<()> {
        if !is_valid_email(self.recipient()) {
            return Err(DomainError::validation("recipient is not a valid email address"));
        }

        match self {
            EmailTask::Verification(task) if task.verification_code.is_empty() => {
                Err(DomainError::validation("verification_code must not be empty"))
            }
            EmailTask::PasswordReset(task) if task.reset_code.is_empty() => {
                Err(DomainError::validation("reset_code must not be empty"))
            }
            EmailTask::Custom(task) => {
                let subject_len = task.subject.chars().count();
                if subject_len == 0 || subject_len > MAX_CUSTOM_SUBJECT_LENGTH {
                    return Err(DomainError::validation(format!(
                        "subject must be between 1 and {} characters",
                        MAX_CUSTOM_SUBJECT_LENGTH
                    )));
                }
                if task.html_content.is_empty() {
                    return Err(DomainError::validation("html_content must not be empty"));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
