use super::email::EmailMessage;
use super::events::NotificationError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Delivery seam for rendered email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError>;
}

/// Collects messages in memory; can be told to fail deliveries.
#[derive(Debug, Default)]
pub struct InMemoryMailer {
    outbox: Mutex<Vec<EmailMessage>>,
    fail_deliveries: AtomicBool,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outbox(&self) -> Vec<EmailMessage> {
        self.outbox.lock().clone()
    }

    pub fn clear(&self) {
        self.outbox.lock().clear();
    }

    pub fn fail_deliveries(&self, fail: bool) {
        self.fail_deliveries.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError> {
        if self.fail_deliveries.load(Ordering::SeqCst) {
            return Err(NotificationError::Delivery {
                reason: format!("outbox refused message '{}'", message.subject),
            });
        }
        self.outbox.lock().push(message);
        Ok(())
    }
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), NotificationError> {
        info!(
            subject = %message.subject,
            from = %message.from,
            to = ?message.to,
            bcc_count = message.bcc.len(),
            "📧 EMAIL"
        );
        Ok(())
    }
}
