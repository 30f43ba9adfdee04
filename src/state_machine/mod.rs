//! # Approval State Machines
//!
//! Two independent workflows share one engine:
//!
//! - courses move `draft -> review -> approved` and can be reopened;
//! - course runs additionally move `approved -> published` and can be
//!   reopened from there.
//!
//! A transition looks up its edge, runs its guards (role, data checklist,
//! organization permission), commits the state record once, then runs
//! best-effort actions. A refused transition leaves the record untouched.

pub mod actions;
pub mod context;
pub mod course_run_state_machine;
pub mod course_state_machine;
pub mod errors;
pub mod events;
pub mod guards;
pub mod persistence;
pub mod states;
pub mod transitions;

// Re-export main types for convenient access
pub use context::{Actor, TransitionContext, TransitionOutcome, WorkflowCollaborators};
pub use course_run_state_machine::CourseRunStateMachine;
pub use course_state_machine::CourseStateMachine;
pub use errors::{ActionError, GuardError, PersistenceError, StateMachineError};
pub use events::WorkflowEvent;
pub use states::{CourseRunWorkflowState, CourseWorkflowState};
pub use transitions::{Edge, COURSE_EDGES, COURSE_RUN_EDGES};

// Common traits and utilities
pub use actions::StateAction;
pub use guards::StateGuard;
pub use persistence::TransitionPersistence;
