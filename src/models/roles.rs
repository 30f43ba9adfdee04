use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Roles a user can hold on a course or, as a default, on an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherUserRole {
    PartnerCoordinator,
    MarketingReviewer,
    Publisher,
    CourseTeam,
}

impl PublisherUserRole {
    pub const ALL: [PublisherUserRole; 4] = [
        Self::PartnerCoordinator,
        Self::MarketingReviewer,
        Self::Publisher,
        Self::CourseTeam,
    ];

    /// Human readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PartnerCoordinator => "Partner Coordinator",
            Self::MarketingReviewer => "Marketing Reviewer",
            Self::Publisher => "Publisher",
            Self::CourseTeam => "Course Team",
        }
    }
}

impl fmt::Display for PublisherUserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartnerCoordinator => write!(f, "partner_coordinator"),
            Self::MarketingReviewer => write!(f, "marketing_reviewer"),
            Self::Publisher => write!(f, "publisher"),
            Self::CourseTeam => write!(f, "course_team"),
        }
    }
}

impl std::str::FromStr for PublisherUserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "partner_coordinator" => Ok(Self::PartnerCoordinator),
            "marketing_reviewer" => Ok(Self::MarketingReviewer),
            "publisher" => Ok(Self::Publisher),
            "course_team" => Ok(Self::CourseTeam),
            _ => Err(format!("Invalid publisher role: {s}")),
        }
    }
}

/// A user's role on a single course. Unique per (course, role).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseUserRole {
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    pub role: PublisherUserRole,
    pub created: DateTime<Utc>,
}

impl fmt::Display for CourseUserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.course_id, self.user_id, self.role)
    }
}

/// Default role holder for an organization, copied onto its courses.
/// Unique per (organization, role).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUserRole {
    pub id: i64,
    pub organization_id: i64,
    pub user_id: i64,
    pub role: PublisherUserRole,
}

impl fmt::Display for OrganizationUserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.organization_id, self.user_id, self.role)
    }
}
