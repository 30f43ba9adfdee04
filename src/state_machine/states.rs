use serde::{Deserialize, Serialize};
use std::fmt;

/// Course workflow states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseWorkflowState {
    /// Initial state, editable by the course team
    #[default]
    Draft,
    /// Waiting on the side that currently owns the record
    Review,
    /// Signed off; may be reopened
    Approved,
}

impl CourseWorkflowState {
    pub const ALL: [CourseWorkflowState; 3] = [Self::Draft, Self::Review, Self::Approved];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Review => "Review",
            Self::Approved => "Approved",
        }
    }

    /// Check if the record can still be edited by its owners
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for CourseWorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Review => write!(f, "review"),
            Self::Approved => write!(f, "approved"),
        }
    }
}

impl std::str::FromStr for CourseWorkflowState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "review" => Ok(Self::Review),
            "approved" => Ok(Self::Approved),
            _ => Err(format!("Invalid course state: {s}")),
        }
    }
}

/// Course run workflow states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseRunWorkflowState {
    #[default]
    Draft,
    Review,
    Approved,
    /// Live in the catalog; may be reopened
    Published,
}

impl CourseRunWorkflowState {
    pub const ALL: [CourseRunWorkflowState; 4] = [
        Self::Draft,
        Self::Review,
        Self::Approved,
        Self::Published,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Review => "Review",
            Self::Approved => "Approved",
            Self::Published => "Published",
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Check if the run is visible in the catalog
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Published)
    }
}

impl fmt::Display for CourseRunWorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Review => write!(f, "review"),
            Self::Approved => write!(f, "approved"),
            Self::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for CourseRunWorkflowState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "review" => Ok(Self::Review),
            "approved" => Ok(Self::Approved),
            "published" => Ok(Self::Published),
            _ => Err(format!("Invalid course run state: {s}")),
        }
    }
}
