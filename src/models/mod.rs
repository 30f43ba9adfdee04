//! # Publisher Models
//!
//! Plain data records for the publishing workflow. Storage is owned by the
//! [`crate::store`] layer; these types carry no persistence logic of their own.

pub mod course;
pub mod course_run;
pub mod organization;
pub mod roles;
pub mod seat;
pub mod state_records;
pub mod user;

// Re-export core models for easy access
pub use course::{Course, NewCourse};
pub use course_run::{CourseRun, NewCourseRun, PacingType};
pub use organization::{Group, Organization, OrganizationExtension, Partner};
pub use roles::{CourseUserRole, OrganizationUserRole, PublisherUserRole};
pub use seat::{Seat, SeatType};
pub use state_records::{CourseRunState, CourseState};
pub use user::{User, UserAttribute};
