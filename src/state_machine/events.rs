use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions that move a course or course run through the approval workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// Hand the record to the other side for review
    SendForReview,
    /// Send a record under review back to draft
    Reject,
    /// Sign off a record under review
    Approve,
    /// Return an approved or published record to draft
    Reopen,
    /// Make an approved course run live (course runs only)
    Publish,
}

impl WorkflowEvent {
    pub const ALL: [WorkflowEvent; 5] = [
        Self::SendForReview,
        Self::Reject,
        Self::Approve,
        Self::Reopen,
        Self::Publish,
    ];

    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SendForReview => "send_for_review",
            Self::Reject => "reject",
            Self::Approve => "approve",
            Self::Reopen => "reopen",
            Self::Publish => "publish",
        }
    }

    /// Events that stamp approval attribution on the record
    pub fn is_approval(&self) -> bool {
        matches!(self, Self::Approve)
    }

    /// Events that return the record to draft and clear approval attribution
    pub fn returns_to_draft(&self) -> bool {
        matches!(self, Self::Reject | Self::Reopen)
    }
}

impl fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_type())
    }
}
