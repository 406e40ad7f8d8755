//! Email address verification flow

use std::sync::Arc;

use vg_shared::NamespacePolicy;

use crate::domain::entities::{EmailTask, VerificationEmail};
use crate::errors::DomainResult;
use crate::services::verification::{CodeDelivery, StateStore, VerificationService};

use super::helpers::{check_code, expiry_minutes, issue_and_deliver};
use super::types::{CodeCheckOutcome, CodeIssued};

/// Send a verification code to an email address
pub struct GenerateEmailVerificationUseCase<S: StateStore + ?Sized, D: CodeDelivery + ?Sized> {
    service: Arc<VerificationService<S>>,
    delivery: Arc<D>,
    policy: NamespacePolicy,
    company_name: Option<String>,
}

impl<S: StateStore + ?Sized, D: CodeDelivery + ?Sized> GenerateEmailVerificationUseCase<S, D> {
    pub fn new(service: Arc<VerificationService<S>>, delivery: Arc<D>, policy: NamespacePolicy) -> Self {
        Self {
            service,
            delivery,
            policy,
            company_name: None,
        }
    }

    /// Name shown in the email
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
                EmailTask::Verification(VerificationEmail {
                    to,
                    verification_code: issued.code,
                    user_name: user_name.map(str::to_string),
                    expiry_minutes,
                    company_name: self.company_name.clone(),
                    logo_url: None,
                    custom_message: None,
                })
            },
        )
        .await
    }
}

/// Check an email verification code, consuming it on success
pub struct VerifyEmailCodeUseCase<S: StateStore + ?Sized> {
    service: Arc<VerificationService<S>>,
    policy: NamespacePolicy,
}

impl<S: StateStore + ?Sized> VerifyEmailCodeUseCase<S> {
    pub fn new(service: Arc<VerificationService<S>>, policy: NamespacePolicy) -> Self {
        Self { service, policy }
    }

    /// On success the caller marks the address verified in its user store
    pub async fn execute(&self, email: &str, code: &str) -> DomainResult<CodeCheckOutcome> {
        check_code(&self.service, &self.policy, email, code, true).await
    }
}
