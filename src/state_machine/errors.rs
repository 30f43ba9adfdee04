use crate::error::PublisherError;
use thiserror::Error;

/// Comprehensive error types for state machine operations
#[derive(Error, Debug)]
pub enum StateMachineError {
    #[error("Invalid state transition from {from} to {requested}")]
    InvalidTransition { from: String, requested: String },

    #[error("Transition not allowed: {reason}")]
    TransitionNotAllowed {
        reason: String,
        failed_preconditions: Vec<String>,
    },

    #[error("Permission denied for user {user_id}: {reason}")]
    PermissionDenied { user_id: i64, reason: String },

    #[error("Persistence operation failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StateMachineError {
    /// Whether the caller may retry after fixing the record or its roles.
    /// Invalid transitions need a different request instead.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TransitionNotAllowed { .. } | Self::PermissionDenied { .. }
        ) || matches!(
            self,
            Self::Persistence(PersistenceError::ConcurrentModification { .. })
        )
    }

    pub fn failed_preconditions(&self) -> &[String] {
        match self {
            Self::TransitionNotAllowed {
                failed_preconditions,
                ..
            } => failed_preconditions,
            _ => &[],
        }
    }
}

/// Specific error type for guard condition failures
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Preconditions failed: {}", failed.join(", "))]
    PreconditionsFailed { failed: Vec<String> },

    #[error("Role not permitted: {reason}")]
    RoleNotPermitted { user_id: i64, reason: String },

    #[error("Missing permission {permission} on course {course_id}")]
    MissingPermission {
        user_id: i64,
        course_id: i64,
        permission: String,
    },

    #[error("Lookup failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Specific error type for action execution failures
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Notification dispatch failed: {event_name}")]
    NotificationDispatchFailed { event_name: String },

    #[error("Invalid state for action execution: {state}")]
    InvalidState { state: String },
}

/// Specific error type for persistence operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Concurrent modification detected for {entity} {id}")]
    ConcurrentModification { entity: &'static str, id: i64 },

    #[error("Database constraint violation: {constraint}")]
    ConstraintViolation { constraint: String },

    #[error("Failed to save record: {reason}")]
    SaveFailed { reason: String },
}

impl From<GuardError> for StateMachineError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::PreconditionsFailed { failed } => Self::TransitionNotAllowed {
                reason: format!("Preconditions failed: {}", failed.join(", ")),
                failed_preconditions: failed,
            },
            GuardError::RoleNotPermitted { user_id, reason } => {
                Self::PermissionDenied { user_id, reason }
            }
            GuardError::MissingPermission {
                user_id,
                course_id,
                permission,
            } => Self::PermissionDenied {
                user_id,
                reason: format!("missing permission {permission} on course {course_id}"),
            },
            GuardError::Persistence(err) => Self::Persistence(err),
        }
    }
}

/// Result type alias for state machine operations
pub type StateMachineResult<T> = Result<T, StateMachineError>;
pub type GuardResult<T> = Result<T, GuardError>;
pub type ActionResult<T> = Result<T, ActionError>;
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Helper function to create internal errors
pub fn internal_error(msg: impl Into<String>) -> StateMachineError {
    StateMachineError::Internal(msg.into())
}

pub fn not_found(entity: &'static str, id: i64) -> PersistenceError {
    PersistenceError::NotFound { entity, id }
}

impl From<StateMachineError> for PublisherError {
    fn from(err: StateMachineError) -> Self {
        PublisherError::StateMachine(err)
    }
}

impl From<PersistenceError> for PublisherError {
    fn from(err: PersistenceError) -> Self {
        PublisherError::Persistence(err)
    }
}
