use super::errors::{ActionError, ActionResult};
use super::events::WorkflowEvent;
use super::guards::{CourseRunSubject, CourseSubject};
use crate::logging::{log_error, log_transition_operation};
use crate::models::PublisherUserRole;
use crate::notifications::{NotificationDispatcher, NotificationEvent};
use async_trait::async_trait;
use tokio::task::JoinHandle;

/// A committed transition as seen by post-commit actions
#[derive(Debug, Clone)]
pub struct CommittedTransition {
    pub workflow: &'static str,
    pub record_id: i64,
    pub from_state: String,
    pub to_state: String,
    pub event: WorkflowEvent,
    pub user_id: i64,
    pub acting_role: PublisherUserRole,
}

/// Trait for implementing state transition actions.
///
/// Actions run after the state record is saved. An action may hand back a
/// task handle for work it started in the background.
#[async_trait]
pub trait StateAction<T: Sync>: Send + Sync {
    /// Execute the action against the committed subject
    async fn execute(
        &self,
        subject: &T,
        transition: &CommittedTransition,
    ) -> ActionResult<Option<JoinHandle<()>>>;

    /// Get a description of this action for logging
    fn description(&self) -> &'static str;
}

/// Run every action; failures are logged and never returned.
pub(crate) async fn execute_actions<T: Sync>(
    actions: &[Box<dyn StateAction<T>>],
    subject: &T,
    transition: &CommittedTransition,
) -> Vec<JoinHandle<()>> {
    let mut pending = Vec::new();
    for action in actions {
        match action.execute(subject, transition).await {
            Ok(Some(handle)) => pending.push(handle),
            Ok(None) => {}
            Err(e) => log_error(
                "state_machine",
                action.description(),
                &e.to_string(),
                Some(&format!(
                    "{} {} {}",
                    transition.workflow, transition.record_id, transition.event
                )),
            ),
        }
    }
    pending
}

/// Action writing the structured transition log entry
pub struct LogTransitionAction;

#[async_trait]
impl<T: Sync> StateAction<T> for LogTransitionAction {
    async fn execute(
        &self,
        _subject: &T,
        transition: &CommittedTransition,
    ) -> ActionResult<Option<JoinHandle<()>>> {
        log_transition_operation(
            transition.workflow,
            transition.record_id,
            &transition.from_state,
            &transition.to_state,
            transition.event.event_type(),
            Some(transition.user_id),
            None,
        );
        Ok(None)
    }

    fn description(&self) -> &'static str {
        "Log the committed transition"
    }
}

/// Action dispatching workflow notifications
pub struct NotifyAction {
    dispatcher: NotificationDispatcher,
}

impl NotifyAction {
    pub fn new(dispatcher: NotificationDispatcher) -> Self {
        Self { dispatcher }
    }

    fn send(&self, event: NotificationEvent) -> ActionResult<Option<JoinHandle<()>>> {
        let kind = event.kind();
        match self.dispatcher.dispatch(event) {
            Some(handle) => Ok(Some(handle)),
            None if self.dispatcher.is_enabled() => Err(ActionError::NotificationDispatchFailed {
                event_name: kind.to_string(),
            }),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StateAction<CourseSubject> for NotifyAction {
    async fn execute(
        &self,
        subject: &CourseSubject,
        transition: &CommittedTransition,
    ) -> ActionResult<Option<JoinHandle<()>>> {
        // Only review hand-offs notify on the course workflow
        if transition.event != WorkflowEvent::SendForReview {
            return Ok(None);
        }
        self.send(NotificationEvent::SentForReview {
            course_id: subject.course.id,
            sender_id: transition.user_id,
            sender_role: transition.acting_role,
        })
    }

    fn description(&self) -> &'static str {
        "Notify the other review side"
    }
}

#[async_trait]
impl StateAction<CourseRunSubject> for NotifyAction {
    async fn execute(
        &self,
        subject: &CourseRunSubject,
        transition: &CommittedTransition,
    ) -> ActionResult<Option<JoinHandle<()>>> {
        if subject.state.name.to_string() != transition.to_state {
            return Err(ActionError::InvalidState {
                state: subject.state.name.to_string(),
            });
        }
        self.send(NotificationEvent::StateChanged {
            course_run_id: subject.run.id,
            state: subject.state.name,
        })
    }

    fn description(&self) -> &'static str {
        "Notify course users of the run state change"
    }
}
