//! Password reset flow

use std::sync::Arc;

use vg_shared::NamespacePolicy;

use crate::domain::entities::{EmailTask, PasswordResetEmail};
use crate::errors::DomainResult;
use crate::services::verification::{CodeDelivery, StateStore, VerificationService};

use super::helpers::{check_code, expiry_minutes, issue_and_deliver};
use super::types::{CodeCheckOutcome, CodeIssued};

/// Send a password reset code to an email address
pub struct GeneratePasswordResetUseCase<S: StateStore + ?Sized, D: CodeDelivery + ?Sized> {
    service: Arc<VerificationService<S>>,
    delivery: Arc<D>,
    policy: NamespacePolicy,
    company_name: Option<String>,
}

impl<S: StateStore + ?Sized, D: CodeDelivery + ?Sized> GeneratePasswordResetUseCase<S, D> {
    pub fn new(service: Arc<VerificationService<S>>, delivery: Arc<D>, policy: NamespacePolicy) -> Self {
        Self {
            service,
            delivery,
            policy,
            company_name: None,
        }
    }

    pub fn with_company_name(mut self, company_name: Option<String>) -> Self {
        self.company_name = company_name;
        self
    }

    pub async fn execute(&self, email: &str, user_name: Option<&str>) -> DomainResult<CodeIssued> {
        let expiry_minutes = expiry_minutes(&self.policy);

        issue_and_deliver(
            &self.service,
            self.delivery.as_ref(),
            &self.policy,
            email,
            |to, issued| {
                EmailTask::PasswordReset(PasswordResetEmail {
                    to,
                    reset_code: issued.code,
                    user_name: user_name.map(str::to_string),
                    expiry_minutes,
                    company_name: self.company_name.clone(),
                })
            },
        )
        .await
    }
}

/// Check a password reset code
///
/// A reset form usually checks the code when it is entered and consumes it
/// when the new password is submitted, hence the two entry points.
pub struct VerifyPasswordResetCodeUseCase<S: StateStore + ?Sized> {
    service: Arc<VerificationService<S>>,
    policy: NamespacePolicy,
}

impl<S: StateStore + ?Sized> VerifyPasswordResetCodeUseCase<S> {
    pub fn new(service: Arc<VerificationService<S>>, policy: NamespacePolicy) -> Self {
        Self { service, policy }
    }

    /// Check the code and leave it outstanding
    pub async fn check(&self, email: &str, code: &str) -> DomainResult<CodeCheckOutcome> {
        check_code(&self.service, &self.policy, email, code, false).await
    }

    /// Check the code and consume it
    pub async fn execute(&self, email: &str, code: &str) -> DomainResult<CodeCheckOutcome> {
        check_code(&self.service, &self.policy, email, code, true).await
    }
}
