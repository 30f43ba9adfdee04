//! # Course Model
//!
//! A course under editorial control. A course owns its runs, its role
//! assignments and exactly one [`CourseState`](super::CourseState) record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub number: String,
    pub short_description: String,
    pub full_description: String,
    pub expected_learnings: String,
    pub prerequisites: String,
    pub level_type: Option<String>,
    /// Path of the banner image, if one was uploaded.
    pub image: Option<String>,
    pub organization_ids: Vec<i64>,
    pub keywords: Vec<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Course {
    /// Keywords as a single comma separated string.
    pub fn keywords_data(&self) -> String {
        self.keywords.join(", ")
    }

    /// First organization, which decides the owning partner.
    pub fn primary_organization_id(&self) -> Option<i64> {
        self.organization_ids.first().copied()
    }

    pub fn add_organization(&mut self, organization_id: i64) {
        if !self.organization_ids.contains(&organization_id) {
            self.organization_ids.push(organization_id);
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Attributes supplied when creating a course; ids and timestamps are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub title: String,
    pub number: String,
    pub short_description: String,
    pub full_description: String,
    pub expected_learnings: String,
    pub prerequisites: String,
    pub level_type: Option<String>,
    pub image: Option<String>,
    pub organization_ids: Vec<i64>,
    pub keywords: Vec<String>,
}

impl NewCourse {
    pub fn into_course(self, id: i64, now: DateTime<Utc>) -> Course {
        Course {
            id,
            title: self.title,
            number: self.number,
            short_description: self.short_description,
            full_description: self.full_description,
            expected_learnings: self.expected_learnings,
            prerequisites: self.prerequisites,
            level_type: self.level_type,
            image: self.image,
            organization_ids: self.organization_ids,
            keywords: self.keywords,
            created: now,
            modified: now,
        }
    }
}
