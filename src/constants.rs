//! # Publisher Constants
//!
//! Permission names, notification event names and workflow role groupings
//! shared by the state machines, the permission backend and the notifier.

use crate::models::PublisherUserRole;

// Re-export state types for convenience
pub use crate::state_machine::{
    CourseRunWorkflowState as CourseRunStatus, CourseWorkflowState as CourseStatus,
};

/// Object permissions granted to organization groups
pub mod permissions {
    pub const VIEW_COURSE: &str = "publisher_view_course";
    pub const EDIT_COURSE: &str = "publisher_edit_course";
    pub const VIEW_COURSE_RUN: &str = "publisher_view_course_run";
    pub const EDIT_COURSE_RUN: &str = "publisher_edit_course_run";

    pub const ALL: [&str; 4] = [VIEW_COURSE, EDIT_COURSE, VIEW_COURSE_RUN, EDIT_COURSE_RUN];
}

/// Notification event names
pub mod events {
    pub const STATE_CHANGED: &str = "state_changed";
    pub const STUDIO_INSTANCE_CREATED: &str = "studio_instance_created";
    pub const COURSE_CREATED: &str = "course_created";
    pub const SENT_FOR_REVIEW: &str = "sent_for_review";
}

/// The two sides of a review: the course team and its reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewSides {
    pub author: PublisherUserRole,
    pub reviewer: PublisherUserRole,
}

impl ReviewSides {
    /// Course metadata is reviewed by marketing
    pub const COURSE: ReviewSides = ReviewSides {
        author: PublisherUserRole::CourseTeam,
        reviewer: PublisherUserRole::MarketingReviewer,
    };

    /// Course run metadata is reviewed by the partner coordinator
    pub const COURSE_RUN: ReviewSides = ReviewSides {
        author: PublisherUserRole::CourseTeam,
        reviewer: PublisherUserRole::PartnerCoordinator,
    };

    pub fn contains(&self, role: PublisherUserRole) -> bool {
        role == self.author || role == self.reviewer
    }

    /// The side opposite `role`, or `None` when `role` takes no part in the review
    pub fn counterpart(&self, role: PublisherUserRole) -> Option<PublisherUserRole> {
        if role == self.author {
            Some(self.reviewer)
        } else if role == self.reviewer {
            Some(self.author)
        } else {
            None
        }
    }
}

/// Role required to publish a course run
pub const PUBLISHING_ROLE: PublisherUserRole = PublisherUserRole::Publisher;

/// Email sender used when configuration does not supply one
pub const DEFAULT_FROM_EMAIL: &str = "publisher@example.com";
