//! Shared steps of the verification flows

use std::sync::Arc;

use vg_shared::utils::masking::mask_subject;
use vg_shared::utils::validation::{is_valid_email, normalize_email};
use vg_shared::{NamespacePolicy, VerificationConfig};

use crate::domain::entities::{EmailTask, IssuedCode, VerificationRequestOptions};
use crate::errors::{DomainError, DomainResult};
use crate::services::verification::{
    CheckOutcome, CodeDelivery, StateStore, VerificationService,
};

use super::email_verification::{GenerateEmailVerificationUseCase, VerifyEmailCodeUseCase};
use super::password_reset::{GeneratePasswordResetUseCase, VerifyPasswordResetCodeUseCase};
use super::types::{CodeCheckOutcome, CodeIssued};

/// Normalize an email address and reject it if it is not one
pub(crate) fn email_subject(email: &str) -> DomainResult<String> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(DomainError::validation("Invalid email address"));
    }
    Ok(email)
}

/// Minutes shown to the recipient, rounded up
pub(crate) fn expiry_minutes(policy: &NamespacePolicy) -> u64 {
    policy.ttl_seconds.div_ceil(60)
}

/// Issue a code and hand the task built from it to the delivery channel
///
/// A code that could not be queued is revoked again so it cannot be used.
pub(crate) async fn issue_and_deliver<S, D, F>(
    service: &VerificationService<S>,
    delivery: &D,
    policy: &NamespacePolicy,
    email: &str,
    build_task: F,
) -> DomainResult<CodeIssued>
where
    S: StateStore + ?Sized,
    D: CodeDelivery + ?Sized,
    F: FnOnce(String, IssuedCode) -> EmailTask,
{
    let subject = email_subject(email)?;
    let options = VerificationRequestOptions::from_policy(policy, subject.clone());
    let issued = service.generate(&options).await?;
    let expires_at = issued.expires_at;

    let task = build_task(subject.clone(), issued);
    let delivered = match task.validate() {
        Ok(()) => delivery.deliver(&task).await,
        Err(e) => Err(e),
    };

    match delivered {
        Ok(job_id) => {
            tracing::info!(
                namespace = %policy.namespace,
                subject = %mask_subject(&subject),
                email_type = task.email_type(),
                job_id = %job_id,
                event = "code_delivery_queued",
                "Verification code queued for delivery"
            );
            Ok(CodeIssued { expires_at, job_id })
        }
        Err(e) => {
            tracing::error!(
                namespace = %policy.namespace,
                subject = %mask_subject(&subject),
                error = %e,
                event = "code_delivery_failed",
                "Failed to queue verification code"
            );
            if let Err(revoke_err) = service.revoke(&policy.namespace, &subject).await {
                tracing::warn!(
                    namespace = %policy.namespace,
                    subject = %mask_subject(&subject),
                    error = %revoke_err,
                    "Failed to revoke undelivered verification code"
                );
            }
            Err(e)
        }
    }
}

/// Check a code in the policy's namespace, consuming it when asked
pub(crate) async fn check_code<S>(
    service: &VerificationService<S>,
    policy: &NamespacePolicy,
    email: &str,
    code: &str,
    consume: bool,
) -> DomainResult<CodeCheckOutcome>
where
    S: StateStore + ?Sized,
{
    let subject = email_subject(email)?;
    let options = VerificationRequestOptions::from_policy(policy, subject.clone());

    let outcome = if consume {
        service.verify_and_consume_detailed(&options, code).await?
    } else {
        service.verify_detailed(&options, code).await?
    };

    Ok(match outcome {
        CheckOutcome::Matched => CodeCheckOutcome::accepted(),
        CheckOutcome::Mismatch { remaining_attempts } => {
            CodeCheckOutcome::rejected(remaining_attempts)
        }
        CheckOutcome::Exhausted => CodeCheckOutcome {
            valid: false,
            remaining_attempts: 0,
            exhausted: true,
        },
        CheckOutcome::NoActiveCode => CodeCheckOutcome::rejected(0),
        // Nothing was counted; report what the outstanding code still has
        CheckOutcome::Malformed => CodeCheckOutcome::rejected(
            service
                .get_remaining_attempts(&policy.namespace, &subject)
                .await?,
        ),
    })
}

/// All verification flows wired to one service and delivery channel
pub struct VerificationUseCases<S: StateStore + ?Sized, D: CodeDelivery + ?Sized> {
    pub generate_email_verification: GenerateEmailVerificationUseCase<S, D>,
    pub verify_email_code: VerifyEmailCodeUseCase<S>,
    pub generate_password_reset: GeneratePasswordResetUseCase<S, D>,
    pub verify_password_reset_code: VerifyPasswordResetCodeUseCase<S>,
}

impl<S: StateStore + ?Sized, D: CodeDelivery + ?Sized> VerificationUseCases<S, D> {
    pub fn new(
        service: Arc<VerificationService<S>>,
        delivery: Arc<D>,
        config: &VerificationConfig,
        company_name: Option<String>,
    ) -> Self {
        Self {
            generate_email_verification: GenerateEmailVerificationUseCase::new(
                Arc::clone(&service),
                Arc::clone(&delivery),
                config.email_verify.clone(),
            )
            .with_company_name(company_name.clone()),
            verify_email_code: VerifyEmailCodeUseCase::new(
                Arc::clone(&service),
                config.email_verify.clone(),
            ),
            generate_password_reset: GeneratePasswordResetUseCase::new(
                Arc::clone(&service),
                delivery,
                config.password_reset.clone(),
            )
            .with_company_name(company_name),
            verify_password_reset_code: VerifyPasswordResetCodeUseCase::new(
                service,
                config.password_reset.clone(),
            ),
        }
    }
}
