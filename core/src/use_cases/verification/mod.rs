//! Email verification and password reset flows
//!
//! Each flow normalizes the email address, drives the verification service
//! in its own namespace and hands the plaintext code to a [`CodeDelivery`]
//! implementation. Nothing here touches the store directly.
//!
//! [`CodeDelivery`]: crate::services::verification::CodeDelivery

mod email_verification;
mod helpers;
mod password_reset;
mod types;

#[cfg(test)]
mod tests;

pub use email_verification::{GenerateEmailVerificationUseCase, VerifyEmailCodeUseCase};
pub use helpers::VerificationUseCases;
pub use password_reset::{GeneratePasswordResetUseCase, VerifyPasswordResetCodeUseCase};
pub use types::{CodeCheckOutcome, CodeIssued};
