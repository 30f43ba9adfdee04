use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatType {
    Honor,
    Audit,
    Verified,
    Professional,
    NoIdProfessional,
    Credit,
    Masters,
}

impl fmt::Display for SeatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Honor => write!(f, "honor"),
            Self::Audit => write!(f, "audit"),
            Self::Verified => write!(f, "verified"),
            Self::Professional => write!(f, "professional"),
            Self::NoIdProfessional => write!(f, "no-id-professional"),
            Self::Credit => write!(f, "credit"),
            Self::Masters => write!(f, "masters"),
        }
    }
}

/// An enrollment track offered on a course run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: i64,
    pub course_run_id: i64,
    pub seat_type: SeatType,
    pub price_cents: i64,
    pub currency: String,
    pub upgrade_deadline: Option<DateTime<Utc>>,
    /// Manually set deadline that wins over the computed one.
    pub upgrade_deadline_override: Option<DateTime<Utc>>,
    pub credit_provider: Option<String>,
    pub credit_hours: Option<u32>,
}

impl Seat {
    pub fn new(id: i64, course_run_id: i64, seat_type: SeatType) -> Self {
        Self {
            id,
            course_run_id,
            seat_type,
            price_cents: 0,
            currency: "USD".to_string(),
            upgrade_deadline: None,
            upgrade_deadline_override: None,
            credit_provider: None,
            credit_hours: None,
        }
    }

    pub fn effective_upgrade_deadline(&self) -> Option<DateTime<Utc>> {
        self.upgrade_deadline_override.or(self.upgrade_deadline)
    }

    pub fn is_paid(&self) -> bool {
        self.price_cents > 0
    }
}
