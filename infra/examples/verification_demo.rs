//! Walk through email verification and password reset end to end
//!
//! Uses the in-process store and the logging delivery channel, so no Redis
//! is needed. Set `VERIGATE__CACHE__BACKEND=redis` and
//! `VERIGATE__DELIVERY__PROVIDER=redis-queue` and use `vg_infra::initialize`
//! for the same flow against Redis.
//!
//! Run with: cargo run --example verification_demo

use std::sync::Arc;

use anyhow::Context;
use vg_core::{VerificationRequestOptions, VerificationService, VerificationUseCases};
use vg_infra::cache::MemoryStateStore;
use vg_infra::delivery::LoggingDelivery;
use vg_infra::telemetry::init_tracing;
use vg_shared::{CodeCharset, LoggingConfig, VerificationConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(&LoggingConfig::default())?;

    let config = VerificationConfig::default();
    let store = Arc::new(MemoryStateStore::new());
    let delivery = Arc::new(LoggingDelivery::new());

    let service = Arc::new(VerificationService::from_config(Arc::clone(&store), &config)?);
    let use_cases = VerificationUseCases::new(
        Arc::clone(&service),
        Arc::clone(&delivery),
        &config,
        Some("Verigate Demo".to_string()),
    );

    let email = "alice@example.com";

    println!("\n=== Email verification ===");
    let issued = use_cases
        .generate_email_verification
        .execute(email, Some("Alice"))
        .await?;
    println!("Queued job {} (expires at {})", issued.job_id, issued.expires_at);

    let code = delivery
        .last_code_for(email)
        .await
        .context("no code in the outbox")?;

    let wrong = use_cases.verify_email_code.execute(email, "000000").await?;
    println!(
        "Wrong code: valid={}, remaining attempts={}",
        wrong.valid, wrong.remaining_attempts
    );

    let right = use_cases.verify_email_code.execute(email, &code).await?;
    println!("Right code: valid={}", right.valid);

    let replay = use_cases.verify_email_code.execute(email, &code).await?;
    println!("Replayed code: valid={}", replay.valid);

    println!("\n=== Password reset ===");
    use_cases
        .generate_password_reset
        .execute(email, None)
        .await?;
    let reset_code = delivery
        .last_code_for(email)
        .await
        .context("no reset code in the outbox")?;

    let checked = use_cases
        .verify_password_reset_code
        .check(email, &reset_code)
        .await?;
    println!("Reset code checked: valid={}", checked.valid);

    let used = use_cases
        .verify_password_reset_code
        .execute(email, &reset_code)
        .await?;
    println!("Reset code used: valid={}", used.valid);

    println!("\n=== Direct service use ===");
    let options = VerificationRequestOptions::new("invite", "team-42")
        .with_charset(CodeCharset::Alphanumeric)
        .with_code_length(8)
        .with_max_attempts(3);
    let invite = service.generate(&options).await?;
    println!("Invite code expires at {}", invite.expires_at);
    println!("Status: {:?}", service.status("invite", "team-42").await?);
    println!(
        "Lowercase entry accepted: {}",
        service
            .verify_and_consume(&options, &invite.code.to_lowercase())
            .await?
    );

    println!("\n=== Rate limiting ===");
    for attempt in 1..=6 {
        match use_cases
            .generate_email_verification
            .execute("bob@example.com", None)
            .await
        {
            Ok(_) => println!("Request {}: code sent", attempt),
            Err(e) => println!("Request {}: {} ({})", attempt, e, e.error_code()),
        }
    }

    println!("\nDemo completed successfully!");
    Ok(())
}
