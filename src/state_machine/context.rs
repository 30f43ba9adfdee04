//! # Transition Context
//!
//! Everything a state machine needs besides the record it moves: who is
//! acting, the collaborators it consults, and caller supplied metadata that is
//! written to the audit trail.
//!
//! ## Audit metadata
//!
//! Each committed transition stores a JSON document next to the history row of
//! the state record:
//!
//! ```json
//! {
//!   "workflow": "course_run",
//!   "event": "approve",
//!   "from_state": "review",
//!   "to_state": "approved",
//!   "correlation_id": "6f1c...",
//!   "note": "approved after legal sign-off"
//! }
//! ```
//!
//! `correlation_id` and `note` come from [`TransitionContext`]; the rest is
//! filled in by the machine.

use super::events::WorkflowEvent;
use crate::config::PublisherConfig;
use crate::models::{PublisherUserRole, User};
use crate::notifications::NotificationDispatcher;
use crate::permissions::AuthorizationBackend;
use crate::state_machine::errors::PersistenceResult;
use crate::store::WorkflowRepository;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

/// Caller supplied metadata for a single transition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionContext {
    /// Ties the transition to an outer request or batch
    pub correlation_id: Option<Uuid>,
    /// Free-form remark kept in the audit trail
    pub note: Option<String>,
}

impl TransitionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    pub fn with_generated_correlation_id(self) -> Self {
        self.with_correlation_id(Uuid::new_v4())
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// History metadata for a committed transition
    pub fn to_metadata(
        &self,
        workflow: &str,
        event: WorkflowEvent,
        from_state: &str,
        to_state: &str,
    ) -> Value {
        json!({
            "workflow": workflow,
            "event": event.event_type(),
            "from_state": from_state,
            "to_state": to_state,
            "correlation_id": self.correlation_id,
            "note": self.note,
        })
    }
}

/// The acting user together with the roles they hold on the course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user: User,
    pub roles: Vec<PublisherUserRole>,
}

impl Actor {
    pub async fn load(
        repository: &dyn WorkflowRepository,
        course_id: i64,
        user_id: i64,
    ) -> PersistenceResult<Self> {
        let user = repository.user(user_id).await?;
        let roles = repository.roles_for_user(course_id, user_id).await?;
        Ok(Self { user, roles })
    }

    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn holds(&self, role: PublisherUserRole) -> bool {
        self.roles.contains(&role)
    }
}

/// Shared collaborators handed to every state machine
#[derive(Clone)]
pub struct WorkflowCollaborators {
    pub repository: Arc<dyn WorkflowRepository>,
    pub authorization: Arc<dyn AuthorizationBackend>,
    pub dispatcher: NotificationDispatcher,
    pub override_roles: Vec<PublisherUserRole>,
}

impl WorkflowCollaborators {
    pub fn new(
        repository: Arc<dyn WorkflowRepository>,
        authorization: Arc<dyn AuthorizationBackend>,
        dispatcher: NotificationDispatcher,
        config: &PublisherConfig,
    ) -> Self {
        Self {
            repository,
            authorization,
            dispatcher,
            override_roles: config.workflow.override_roles.clone(),
        }
    }
}

impl fmt::Debug for WorkflowCollaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowCollaborators")
            .field("authorization", &self.authorization.description())
            .field("dispatcher", &self.dispatcher)
            .field("override_roles", &self.override_roles)
            .finish()
    }
}

/// Result of a committed transition
#[derive(Debug)]
pub struct TransitionOutcome<S> {
    pub from: S,
    pub to: S,
    pub event: WorkflowEvent,
    /// Notifications still in flight; dropping them detaches the tasks
    pub pending_notifications: Vec<JoinHandle<()>>,
}

impl<S> TransitionOutcome<S> {
    /// Wait for every dispatched notification to finish.
    pub async fn settle(&mut self) {
        for handle in self.pending_notifications.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Notification task did not complete");
            }
        }
    }
}
