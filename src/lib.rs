#![allow(clippy::doc_markdown)] // Allow technical terms like PartnerCoordinator in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Course Publisher
//!
//! Editorial workflow for a course catalog: courses and course runs move from
//! draft through review and approval, runs are finally published.
//!
//! ## Overview
//!
//! Each course and each course run owns one workflow state record. The record
//! only changes through a state machine, which checks a fixed edge table, the
//! acting user's course role, the organization permission and a metadata
//! checklist before committing. Notifications go out after the commit and
//! never undo it.
//!
//! ## Module Organization
//!
//! - [`models`] - Courses, runs, seats, organizations, users and roles
//! - [`state_machine`] - Course and course run approval workflows
//! - [`store`] - Repository seam with history capture and an in-memory implementation
//! - [`permissions`] - Organization group permission checks
//! - [`notifications`] - Best-effort email notifications
//! - [`services`] - Record creation and studio linking
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use course_publisher::config::PublisherConfig;
//! use course_publisher::notifications::LoggingMailer;
//! use course_publisher::permissions::AllowAll;
//! use course_publisher::services::PublisherService;
//! use course_publisher::state_machine::WorkflowEvent;
//! use course_publisher::store::InMemoryRepository;
//! use std::sync::Arc;
//!
//! # async fn example(course_id: i64, user_id: i64) -> Result<(), Box<dyn std::error::Error>> {
//! let service = PublisherService::with_mailer(
//!     PublisherConfig::load(None)?,
//!     Arc::new(InMemoryRepository::new()),
//!     Arc::new(AllowAll),
//!     Arc::new(LoggingMailer),
//! );
//!
//! let machine = service.course_state_machine(course_id);
//! if machine.can_send_for_review().await? {
//!     machine.transition(WorkflowEvent::SendForReview, user_id).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod notifications;
pub mod permissions;
pub mod services;
pub mod state_machine;
pub mod store;

pub use config::{ConfigurationError, PublisherConfig};
pub use constants::{CourseRunStatus, CourseStatus, ReviewSides};
pub use error::{PublisherError, PublisherResult};
pub use models::{Course, CourseRun, PublisherUserRole};
pub use services::PublisherService;
pub use state_machine::{
    CourseRunStateMachine, CourseStateMachine, StateMachineError, WorkflowEvent,
};
