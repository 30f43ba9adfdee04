use crate::constants::events;
use crate::models::PublisherUserRole;
use crate::state_machine::errors::PersistenceError;
use crate::state_machine::states::CourseRunWorkflowState;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    StateChanged,
    StudioInstanceCreated,
    CourseCreated,
    SentForReview,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StateChanged => events::STATE_CHANGED,
            Self::StudioInstanceCreated => events::STUDIO_INSTANCE_CREATED,
            Self::CourseCreated => events::COURSE_CREATED,
            Self::SentForReview => events::SENT_FOR_REVIEW,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something worth telling the people attached to a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A course run moved to a new workflow state
    StateChanged {
        course_run_id: i64,
        state: CourseRunWorkflowState,
    },
    /// The authoring studio created (or re-linked) the run
    StudioInstanceCreated { course_run_id: i64, updated: bool },
    /// A course was created together with its first run
    CourseCreated { course_id: i64, course_run_id: i64 },
    /// A course was handed to the other side for review. `sender_role` is
    /// the role the sender acted in, which decides who receives it.
    SentForReview {
        course_id: i64,
        sender_id: i64,
        sender_role: PublisherUserRole,
    },
}

impl NotificationEvent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::StateChanged { .. } => NotificationKind::StateChanged,
            Self::StudioInstanceCreated { .. } => NotificationKind::StudioInstanceCreated,
            Self::CourseCreated { .. } => NotificationKind::CourseCreated,
            Self::SentForReview { .. } => NotificationKind::SentForReview,
        }
    }
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Lookup failed while preparing {kind}: {source}")]
    Lookup {
        kind: NotificationKind,
        #[source]
        source: PersistenceError,
    },

    #[error("No recipient for {kind}: {reason}")]
    MissingRecipient {
        kind: NotificationKind,
        reason: String,
    },

    #[error("Delivery failed: {reason}")]
    Delivery { reason: String },
}

impl NotificationError {
    pub fn lookup(kind: NotificationKind) -> impl FnOnce(PersistenceError) -> Self {
        move |source| Self::Lookup { kind, source }
    }
}
