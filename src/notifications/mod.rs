//! # Notifications
//!
//! Best-effort side effects of workflow changes. Notifications are dispatched
//! after a transition commits; a slow or failing notifier never blocks or
//! undoes the transition, its failures are only logged.

pub mod dispatcher;
pub mod email;
pub mod events;
pub mod mailer;

pub use dispatcher::{NotificationDispatcher, Notifier};
pub use email::{EmailMessage, EmailNotifier};
pub use events::{NotificationError, NotificationEvent, NotificationKind};
pub use mailer::{InMemoryMailer, LoggingMailer, Mailer};
