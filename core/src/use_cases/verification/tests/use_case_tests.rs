//! Tests for the email verification and password reset flows

use std::sync::Arc;

use vg_shared::{HasherConfig, NamespacePolicy, VerificationConfig};

use crate::domain::entities::{CodeStatus, EmailTask};
use crate::errors::DomainError;
use crate::services::verification::tests::mocks::{MockDelivery, MockStateStore};
use crate::services::verification::VerificationService;
use crate::use_cases::verification::{
    GenerateEmailVerificationUseCase, VerificationUseCases, VerifyEmailCodeUseCase,
};

fn config() -> VerificationConfig {
    VerificationConfig {
        hasher: HasherConfig::fast(),
        ..VerificationConfig::default()
    }
}

fn use_cases(
    delivery: Arc<MockDelivery>,
) -> (
    Arc<VerificationService<MockStateStore>>,
    VerificationUseCases<MockStateStore, MockDelivery>,
) {
    let config = config();
    let service = Arc::new(
        VerificationService::from_config(Arc::new(MockStateStore::new()), &config).unwrap(),
    );
    let use_cases = VerificationUseCases::new(
        Arc::clone(&service),
        delivery,
        &config,
        Some("Verigate".to_string()),
    );
    (service, use_cases)
}

fn delivered_code(delivery: &MockDelivery) -> String {
    match delivery.last_task() {
        Some(EmailTask::Verification(task)) => task.verification_code,
        Some(EmailTask::PasswordReset(task)) => task.reset_code,
        other => panic!("Expected a code email, got {:?}", other),
    }
}

fn wrong_code(code: &str) -> String {
    let first = if code.starts_with('0') { '1' } else { '0' };
    format!("{}{}", first, &code[1..])
}

#[tokio::test]
async fn test_email_verification_flow() {
    let delivery = Arc::new(MockDelivery::new(false));
    let (_, use_cases) = use_cases(delivery.clone());

    let issued = use_cases
        .generate_email_verification
        .execute("  A@B.com ", Some("Alice"))
        .await
        .unwrap();
    assert!(issued.job_id.starts_with("mock-job-"));

    match delivery.last_task() {
        Some(EmailTask::Verification(task)) => {
            assert_eq!(task.to, "a@b.com");
            assert_eq!(task.user_name.as_deref(), Some("Alice"));
            assert_eq!(task.expiry_minutes, 10);
            assert_eq!(task.company_name.as_deref(), Some("Verigate"));
        }
        other => panic!("Expected verification email, got {:?}", other),
    }

    let code = delivered_code(&delivery);
    let outcome = use_cases
        .verify_email_code
        .execute("a@b.com", &code)
        .await
        .unwrap();
    assert!(outcome.valid);
    assert!(outcome.into_result().is_ok());

    // Consumed
    let replay = use_cases
        .verify_email_code
        .execute("a@b.com", &code)
        .await
        .unwrap();
    assert!(!replay.valid);
    assert!(!replay.exhausted);
    assert!(matches!(
        replay.into_result(),
        Err(DomainError::InvalidOrExpiredCode {
            remaining_attempts: Some(0)
        })
    ));
}

#[tokio::test]
async fn test_wrong_code_reports_remaining_attempts() {
    let delivery = Arc::new(MockDelivery::new(false));
    let (_, use_cases) = use_cases(delivery.clone());

    use_cases
        .generate_email_verification
        .execute("a@b.com", None)
        .await
        .unwrap();
    let wrong = wrong_code(&delivered_code(&delivery));

    let outcome = use_cases
        .verify_email_code
        .execute("a@b.com", &wrong)
        .await
        .unwrap();
    assert_eq!(outcome.remaining_attempts, 4);
    assert!(matches!(
        outcome.into_result(),
        Err(DomainError::InvalidOrExpiredCode {
            remaining_attempts: Some(4)
        })
    ));
}

#[tokio::test]
async fn test_last_attempt_reports_exhausted() {
    let delivery = Arc::new(MockDelivery::new(false));
    let config = config();
    let service = Arc::new(
        VerificationService::from_config(Arc::new(MockStateStore::new()), &config).unwrap(),
    );
    let policy = NamespacePolicy {
        max_attempts: 2,
        ..NamespacePolicy::email_verify()
    };
    let generate =
        GenerateEmailVerificationUseCase::new(service.clone(), delivery.clone(), policy.clone());
    let verify = VerifyEmailCodeUseCase::new(service, policy);

    generate.execute("a@b.com", None).await.unwrap();
    let wrong = wrong_code(&delivered_code(&delivery));

    assert!(!verify.execute("a@b.com", &wrong).await.unwrap().exhausted);
    let last = verify.execute("a@b.com", &wrong).await.unwrap();
    assert!(last.exhausted);
    assert!(matches!(
        last.into_result(),
        Err(DomainError::AttemptsExhausted)
    ));
}

#[tokio::test]
async fn test_invalid_email_is_rejected() {
    let delivery = Arc::new(MockDelivery::new(false));
    let (_, use_cases) = use_cases(delivery.clone());

    let result = use_cases
        .generate_email_verification
        .execute("not-an-email", None)
        .await;
    assert!(matches!(result, Err(DomainError::Validation { .. })));
    assert!(delivery.last_task().is_none());
}

#[tokio::test]
async fn test_failed_delivery_revokes_code() {
    let delivery = Arc::new(MockDelivery::new(true));
    let (service, use_cases) = use_cases(delivery);

    let result = use_cases
        .generate_email_verification
        .execute("a@b.com", None)
        .await;
    assert!(matches!(result, Err(DomainError::Delivery { .. })));
    assert_eq!(
        service.status("email-verify", "a@b.com").await.unwrap(),
        CodeStatus::Absent
    );
}

#[tokio::test]
async fn test_password_reset_flow() {
    let delivery = Arc::new(MockDelivery::new(false));
    let (service, use_cases) = use_cases(delivery.clone());

    use_cases
        .generate_password_reset
        .execute("a@b.com", Some("Alice"))
        .await
        .unwrap();

    match delivery.last_task() {
        Some(EmailTask::PasswordReset(task)) => assert_eq!(task.expiry_minutes, 60),
        other => panic!("Expected password reset email, got {:?}", other),
    }
    let code = delivered_code(&delivery);

    // Checking is repeatable, executing consumes
    let reset = &use_cases.verify_password_reset_code;
    assert!(reset.check("a@b.com", &code).await.unwrap().valid);
    assert!(reset.check("a@b.com", &code).await.unwrap().valid);
    assert!(reset.execute("a@b.com", &code).await.unwrap().valid);
    assert!(!reset.execute("a@b.com", &code).await.unwrap().valid);

    // The email verification namespace is unaffected
    assert_eq!(
        service.status("email-verify", "a@b.com").await.unwrap(),
        CodeStatus::Absent
    );
}

#[tokio::test]
async fn test_password_reset_rate_limit() {
    let delivery = Arc::new(MockDelivery::new(false));
    let (_, use_cases) = use_cases(delivery);

    for _ in 0..3 {
        use_cases
            .generate_password_reset
            .execute("a@b.com", None)
            .await
            .unwrap();
    }

    assert!(matches!(
        use_cases
            .generate_password_reset
            .execute("a@b.com", None)
            .await,
        Err(DomainError::TooManyRequests { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_losing_a_consume_race_is_not_exhaustion() {
    let delivery = Arc::new(MockDelivery::new(false));
    let (_, use_cases) = use_cases(delivery.clone());
    let use_cases = Arc::new(use_cases);

    use_cases
        .generate_email_verification
        .execute("a@b.com", None)
        .await
        .unwrap();
    let code = delivered_code(&delivery);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let use_cases = Arc::clone(&use_cases);
        let code = code.clone();
        handles.push(tokio::spawn(async move {
            use_cases
                .verify_email_code
                .execute("a@b.com", &code)
                .await
                .unwrap()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        let outcome = handle.await.unwrap();
        if outcome.valid {
            winners += 1;
        } else {
            assert!(!outcome.exhausted);
            assert!(matches!(
                outcome.into_result(),
                Err(DomainError::InvalidOrExpiredCode { .. })
            ));
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_malformed_code_keeps_attempts() {
    let delivery = Arc::new(MockDelivery::new(false));
    let (_, use_cases) = use_cases(delivery.clone());

    use_cases
        .generate_email_verification
        .execute("a@b.com", None)
        .await
        .unwrap();

    let outcome = use_cases
        .verify_email_code
        .execute("a@b.com", "not-a-code")
        .await
        .unwrap();
    assert!(!outcome.valid);
    assert!(!outcome.exhausted);
    assert_eq!(outcome.remaining_attempts, 5);
}
