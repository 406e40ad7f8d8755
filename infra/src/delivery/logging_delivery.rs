//! Development delivery channel
//!
//! Nothing leaves the process. Each task is logged with a masked recipient
//! and kept in an outbox that tests and demos can read back. The code
//! itself is never logged.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use vg_core::{CodeDelivery, DomainResult, EmailTask};
use vg_shared::utils::masking::mask_subject;

/// Upper bound on retained tasks; the oldest are dropped first
const OUTBOX_CAPACITY: usize = 256;

#[derive(Debug, Default)]
pub struct LoggingDelivery {
    outbox: Mutex<Vec<(String, EmailTask)>>,
}

impl LoggingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks delivered so far, oldest first
    pub async fn outbox(&self) -> Vec<EmailTask> {
        self.outbox
            .lock()
            .await
            .iter()
            .map(|(_, task)| task.clone())
            .collect()
    }

    /// Most recent task addressed to `recipient`
    pub async fn last_for(&self, recipient: &str) -> Option<EmailTask> {
        self.outbox
            .lock()
            .await
            .iter()
            .rev()
            .find(|(_, task)| task.recipient().eq_ignore_ascii_case(recipient))
            .map(|(_, task)| task.clone())
    }

    /// Code carried by the most recent task to `recipient`
    pub async fn last_code_for(&self, recipient: &str) -> Option<String> {
        match self.last_for(recipient).await? {
            EmailTask::Verification(email) => Some(email.verification_code),
            EmailTask::PasswordReset(email) => Some(email.reset_code),
            EmailTask::Custom(_) => None,
        }
    }
}

#[async_trait]
impl CodeDelivery for LoggingDelivery {
    async fn deliver(&self, task: &EmailTask) -> DomainResult<String> {
        let job_id = Uuid::new_v4().to_string();

        info!(
            job_id = %job_id,
            email_type = task.email_type(),
            recipient = %mask_subject(task.recipient()),
            "Email task recorded (logging delivery)"
        );

        let mut outbox = self.outbox.lock().await;
        if outbox.len() >= OUTBOX_CAPACITY {
            outbox.remove(0);
        }
        outbox.push((job_id.clone(), task.clone()));

        Ok(job_id)
    }
}
