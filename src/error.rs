//! Top-level error type for the publisher crate.

use crate::config::ConfigurationError;
use crate::notifications::NotificationError;
use crate::state_machine::errors::{PersistenceError, StateMachineError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublisherError {
    #[error("State machine error: {0}")]
    StateMachine(StateMachineError),
    #[error("Persistence error: {0}")]
    Persistence(PersistenceError),
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl PublisherError {
    /// Whether the failure was a permission check rather than a data or workflow problem
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Self::StateMachine(StateMachineError::PermissionDenied { .. })
        )
    }
}

pub type PublisherResult<T> = std::result::Result<T, PublisherError>;
