use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Identifies the record a history row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Course(i64),
    CourseRun(i64),
    CourseState(i64),
    CourseRunState(i64),
    CourseUserRole(i64),
    OrganizationUserRole(i64),
    Seat(i64),
}

impl EntityRef {
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::Course(_) => "course",
            Self::CourseRun(_) => "course_run",
            Self::CourseState(_) => "course_state",
            Self::CourseRunState(_) => "course_run_state",
            Self::CourseUserRole(_) => "course_user_role",
            Self::OrganizationUserRole(_) => "organization_user_role",
            Self::Seat(_) => "seat",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Course(id)
            | Self::CourseRun(id)
            | Self::CourseState(id)
            | Self::CourseRunState(id)
            | Self::CourseUserRole(id)
            | Self::OrganizationUserRole(id)
            | Self::Seat(id) => *id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity_type(), self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Created,
    Changed,
}

/// One append-only audit row. Never updated or removed once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub history_id: Uuid,
    pub entity: EntityRef,
    pub change_type: ChangeType,
    /// Acting user, when known.
    pub history_user: Option<i64>,
    pub history_date: DateTime<Utc>,
    /// Full record as saved, plus optional `metadata` from the caller.
    pub snapshot: Value,
}

impl HistoryRecord {
    pub fn new(
        entity: EntityRef,
        change_type: ChangeType,
        history_user: Option<i64>,
        snapshot: Value,
    ) -> Self {
        Self {
            history_id: Uuid::new_v4(),
            entity,
            change_type,
            history_user,
            history_date: Utc::now(),
            snapshot,
        }
    }
}
