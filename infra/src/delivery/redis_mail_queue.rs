//! Redis list backed mail queue

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use vg_core::{CodeDelivery, DomainResult, EmailTask};
use vg_shared::utils::masking::mask_subject;

use crate::cache::RedisClient;
use crate::InfrastructureError;

/// Envelope pushed onto the queue
///
/// The task's fields sit at the top level next to `job_id`, tagged by
/// `email_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailJob {
    pub job_id: String,
    pub enqueued_at: DateTime<Utc>,
    #[serde(flatten)]
    pub task: EmailTask,
}

impl MailJob {
    pub fn new(task: EmailTask) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            enqueued_at: Utc::now(),
            task,
        }
    }
}

/// Mail queue on a Redis list, consumed by the mail worker with `BRPOP`
#[derive(Clone)]
pub struct RedisMailQueue {
    client: RedisClient,
    queue_name: String,
}

impl RedisMailQueue {
    pub fn new(client: RedisClient, queue_name: impl Into<String>) -> Self {
        Self {
            client,
            queue_name: queue_name.into(),
        }
    }

    /// Fully prefixed list key
    pub fn queue_key(&self) -> String {
        self.client.make_key(&self.queue_name)
    }

    /// Serialize and push one job, returning its id
    ///
    /// Pushes are not retried: a push that timed out may still have landed,
    /// and a retry would mail the code twice.
    pub async fn enqueue(&self, task: &EmailTask) -> Result<String, InfrastructureError> {
        let job = MailJob::new(task.clone());
        let payload = serde_json::to_string(&job)?;

        let mut conn = self.client.connection();
        let depth: i64 = self
            .client
            .execute_once(
                "enqueue_mail",
                redis::cmd("LPUSH")
                    .arg(self.queue_key())
                    .arg(payload)
                    .query_async(&mut conn),
            )
            .await?;

        info!(
            job_id = %job.job_id,
            email_type = task.email_type(),
            recipient = %mask_subject(task.recipient()),
            queue_depth = depth,
            "Mail job enqueued"
        );

        Ok(job.job_id)
    }
}

#[async_trait]
impl CodeDelivery for RedisMailQueue {
    async fn deliver(&self, task: &EmailTask) -> DomainResult<String> {
        self.enqueue(task).await.map_err(|e| {
            error!(
                email_type = task.email_type(),
                error = %e,
                "Failed to enqueue mail job"
            );
            match e {
                InfrastructureError::Cache(_) | InfrastructureError::Timeout { .. } => {
                    InfrastructureError::Delivery(e.to_string()).into()
                }
                other => other.into(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vg_core::VerificationEmail;

    fn verification_task() -> EmailTask {
        EmailTask::Verification(VerificationEmail {
            to: "alice@example.com".to_string(),
            verification_code: "123456".to_string(),
            user_name: Some("Alice".to_string()),
            expiry_minutes: 10,
            company_name: None,
            logo_url: None,
            custom_message: None,
        })
    }

    #[test]
    fn test_job_envelope_is_flat() {
        let job = MailJob::new(verification_task());
        let value = serde_json::to_value(&job).unwrap();

        assert_eq!(value["email_type"], "verification");
        assert_eq!(value["to"], "alice@example.com");
        assert_eq!(value["verification_code"], "123456");
        assert_eq!(value["job_id"], job.job_id.as_str());
        assert!(value.get("company_name").is_none());
        assert!(Uuid::parse_str(&job.job_id).is_ok());
    }

    #[test]
    fn test_job_ids_are_unique() {
        let a = MailJob::new(verification_task());
        let b = MailJob::new(verification_task());
        assert_ne!(a.job_id, b.job_id);
    }

    #[test]
    fn test_job_parses_back() {
        let job = MailJob::new(verification_task());
        let json = serde_json::to_string(&job).unwrap();
        let parsed: MailJob = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.job_id, job.job_id);
        assert_eq!(parsed.task.recipient(), "alice@example.com");
    }
}
