//! # Workflow State Records
//!
//! The persisted workflow position of a course or course run. Each record
//! belongs to exactly one owner, is created together with it in `Draft`, and is
//! only mutated by the state machines in [`crate::state_machine`].
//!
//! `version` is bumped by the store on every committed save and is checked on
//! the next one, so two writers racing on the same record cannot both commit.

use super::PublisherUserRole;
use crate::state_machine::states::{CourseRunWorkflowState, CourseWorkflowState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseState {
    pub course_id: i64,
    pub name: CourseWorkflowState,
    /// Side of the review currently expected to act.
    pub owner_role: PublisherUserRole,
    pub approved_by_role: Option<PublisherUserRole>,
    pub approved_by_user: Option<i64>,
    pub marketing_reviewed: bool,
    pub version: u64,
    pub modified: DateTime<Utc>,
}

impl CourseState {
    /// Initial record for a freshly created course.
    pub fn new(course_id: i64, owner_role: PublisherUserRole) -> Self {
        Self {
            course_id,
            name: CourseWorkflowState::default(),
            owner_role,
            approved_by_role: None,
            approved_by_user: None,
            marketing_reviewed: false,
            version: 0,
            modified: Utc::now(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.name == CourseWorkflowState::Approved
    }
}

impl fmt::Display for CourseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRunState {
    pub course_run_id: i64,
    pub name: CourseRunWorkflowState,
    pub owner_role: PublisherUserRole,
    pub approved_by_role: Option<PublisherUserRole>,
    pub version: u64,
    pub modified: DateTime<Utc>,
}

impl CourseRunState {
    pub fn new(course_run_id: i64, owner_role: PublisherUserRole) -> Self {
        Self {
            course_run_id,
            name: CourseRunWorkflowState::default(),
            owner_role,
            approved_by_role: None,
            version: 0,
            modified: Utc::now(),
        }
    }

    pub fn is_published(&self) -> bool {
        self.name == CourseRunWorkflowState::Published
    }
}

impl fmt::Display for CourseRunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.display_name())
    }
}
