use super::events::{NotificationError, NotificationEvent};
use crate::logging::{log_error, log_notification_operation};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Sink for workflow notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotificationError>;

    fn description(&self) -> &'static str;
}

/// Fires notifications on the tokio runtime without waiting for them.
///
/// The returned handle lets callers wait for delivery; dropping it detaches
/// the task. Failures are logged inside the task and never reach the caller.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    enabled: bool,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("notifier", &self.notifier.description())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, enabled: bool) -> Self {
        Self { notifier, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn dispatch(&self, event: NotificationEvent) -> Option<JoinHandle<()>> {
        if !self.enabled {
            debug!(kind = %event.kind(), "Notifications disabled, dropping event");
            return None;
        }

        let Ok(handle) = Handle::try_current() else {
            warn!(kind = %event.kind(), "No async runtime available, notification dropped");
            return None;
        };

        let notifier = Arc::clone(&self.notifier);
        Some(handle.spawn(async move {
            let kind = event.kind();
            match notifier.notify(&event).await {
                Ok(()) => log_notification_operation(
                    kind.as_str(),
                    notifier.description(),
                    "delivered",
                    None,
                ),
                Err(e) => log_error(
                    "notifications",
                    kind.as_str(),
                    &e.to_string(),
                    Some(notifier.description()),
                ),
            }
        }))
    }
}
