use super::{Course, Partner};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingType {
    InstructorPaced,
    SelfPaced,
}

impl PacingType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::InstructorPaced => "Instructor-paced",
            Self::SelfPaced => "Self-paced",
        }
    }
}

impl fmt::Display for PacingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstructorPaced => write!(f, "instructor_paced"),
            Self::SelfPaced => write!(f, "self_paced"),
        }
    }
}

/// A scheduled offering of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRun {
    pub id: i64,
    pub course_id: i64,
    /// Identifier assigned by the authoring studio once the run is created there.
    pub lms_course_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub pacing_type: Option<PacingType>,
    pub min_effort: Option<u32>,
    pub max_effort: Option<u32>,
    pub language: Option<String>,
    pub transcript_languages: Vec<String>,
    pub staff_ids: Vec<i64>,
    pub preview_url: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl CourseRun {
    /// `"{title}: {start}"`, the label used throughout the publisher.
    pub fn display_with(&self, course: &Course) -> String {
        match self.start {
            Some(start) => format!("{}: {}", course.title, start),
            None => format!("{}: None", course.title),
        }
    }

    /// Link to the run in the partner's authoring studio.
    pub fn studio_url(&self, partner: &Partner) -> Option<String> {
        let lms_course_id = self.lms_course_id.as_deref().filter(|id| !id.is_empty())?;
        let studio_url = partner.studio_url.as_deref()?;
        Some(format!(
            "{}/course/{}",
            studio_url.trim_end_matches('/'),
            lms_course_id
        ))
    }

    pub fn pacing_display(&self) -> &'static str {
        self.pacing_type.map(|p| p.display_name()).unwrap_or("")
    }
}

/// Attributes supplied when creating a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourseRun {
    pub course_id: i64,
    pub lms_course_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub pacing_type: Option<PacingType>,
    pub min_effort: Option<u32>,
    pub max_effort: Option<u32>,
    pub language: Option<String>,
    pub transcript_languages: Vec<String>,
    pub staff_ids: Vec<i64>,
    pub preview_url: Option<String>,
}

impl NewCourseRun {
    pub fn into_course_run(self, id: i64, now: DateTime<Utc>) -> CourseRun {
        CourseRun {
            id,
            course_id: self.course_id,
            lms_course_id: self.lms_course_id,
            start: self.start,
            end: self.end,
            pacing_type: self.pacing_type,
            min_effort: self.min_effort,
            max_effort: self.max_effort,
            language: self.language,
            transcript_languages: self.transcript_languages,
            staff_ids: self.staff_ids,
            preview_url: self.preview_url,
            created: now,
            modified: now,
        }
    }
}
