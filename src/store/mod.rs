//! # Store
//!
//! The persistence collaborator consumed by the workflow core.
//!
//! [`WorkflowRepository`] is the seam: every state machine, guard and
//! notifier reads and writes through it. [`InMemoryRepository`] is the
//! reference implementation used by the service layer and the test suite;
//! a database-backed repository implements the same trait.
//!
//! Every committed save appends one immutable [`HistoryRecord`] capturing who
//! changed what and when.

pub mod history;
pub mod memory;
pub mod repository;

pub use history::{ChangeType, EntityRef, HistoryRecord};
pub use memory::InMemoryRepository;
pub use repository::WorkflowRepository;
