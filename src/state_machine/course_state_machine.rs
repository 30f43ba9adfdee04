use super::{
    actions::{execute_actions, CommittedTransition, LogTransitionAction, NotifyAction, StateAction},
    context::{Actor, TransitionContext, TransitionOutcome, WorkflowCollaborators},
    errors::{internal_error, StateMachineError, StateMachineResult},
    events::WorkflowEvent,
    guards::{
        acting_role, check_guards, course_review_blockers, CourseReadyForReviewGuard,
        CourseSubject, GuardRequest, OrganizationPermissionGuard, ReviewRoleGuard, StateGuard,
    },
    persistence::{RepositoryPersistence, TransitionPersistence},
    states::CourseWorkflowState,
    transitions::{available_events, event_for, target_for, COURSE_EDGES},
};
use crate::constants::{permissions::EDIT_COURSE, ReviewSides};
use crate::models::{CourseState, PublisherUserRole};
use serde_json::json;
use tracing::instrument;

/// Approval workflow of a single course
pub struct CourseStateMachine {
    course_id: i64,
    collaborators: WorkflowCollaborators,
    persistence: RepositoryPersistence,
}

impl CourseStateMachine {
    pub const WORKFLOW: &'static str = "course";

    pub fn new(course_id: i64, collaborators: WorkflowCollaborators) -> Self {
        let persistence = RepositoryPersistence::new(collaborators.repository.clone());
        Self {
            course_id,
            collaborators,
            persistence,
        }
    }

    pub fn course_id(&self) -> i64 {
        self.course_id
    }

    /// Get the current state of the course
    pub async fn current_state(&self) -> StateMachineResult<CourseWorkflowState> {
        Ok(self.state_record().await?.name)
    }

    pub async fn state_record(&self) -> StateMachineResult<CourseState> {
        Ok(self.persistence.resolve_current_state(self.course_id).await?)
    }

    /// Events with an edge out of the current state
    pub async fn available_events(&self) -> StateMachineResult<Vec<WorkflowEvent>> {
        Ok(available_events(COURSE_EDGES, self.current_state().await?))
    }

    /// Checklist items still missing before the course may go to review
    pub async fn review_blockers(&self) -> StateMachineResult<Vec<String>> {
        let course = self.collaborators.repository.course(self.course_id).await?;
        Ok(course_review_blockers(&course))
    }

    /// Whether the course metadata is complete enough for review. Read-only.
    pub async fn can_send_for_review(&self) -> StateMachineResult<bool> {
        Ok(self.review_blockers().await?.is_empty())
    }

    pub async fn transition(
        &self,
        event: WorkflowEvent,
        user_id: i64,
    ) -> StateMachineResult<TransitionOutcome<CourseWorkflowState>> {
        self.transition_with_context(event, user_id, TransitionContext::default())
            .await
    }

    pub async fn transition_with_context(
        &self,
        event: WorkflowEvent,
        user_id: i64,
        context: TransitionContext,
    ) -> StateMachineResult<TransitionOutcome<CourseWorkflowState>> {
        let subject = self.load_subject().await?;
        self.execute(subject, event, user_id, &context).await
    }

    /// Move to `target`, resolving the event from the edge table
    pub async fn change_state(
        &self,
        target: CourseWorkflowState,
        user_id: i64,
    ) -> StateMachineResult<TransitionOutcome<CourseWorkflowState>> {
        self.change_state_with_context(target, user_id, TransitionContext::default())
            .await
    }

    pub async fn change_state_with_context(
        &self,
        target: CourseWorkflowState,
        user_id: i64,
        context: TransitionContext,
    ) -> StateMachineResult<TransitionOutcome<CourseWorkflowState>> {
        let subject = self.load_subject().await?;
        let from = subject.state.name;
        let event = event_for(COURSE_EDGES, from, target).ok_or_else(|| {
            StateMachineError::InvalidTransition {
                from: from.to_string(),
                requested: target.to_string(),
            }
        })?;
        self.execute(subject, event, user_id, &context).await
    }

    async fn load_subject(&self) -> StateMachineResult<CourseSubject> {
        let course = self.collaborators.repository.course(self.course_id).await?;
        let state = self.persistence.resolve_current_state(self.course_id).await?;
        Ok(CourseSubject { course, state })
    }

    #[instrument(skip(self, subject, context), fields(course_id = self.course_id))]
    async fn execute(
        &self,
        mut subject: CourseSubject,
        event: WorkflowEvent,
        user_id: i64,
        context: &TransitionContext,
    ) -> StateMachineResult<TransitionOutcome<CourseWorkflowState>> {
        let from = subject.state.name;
        let to = target_for(COURSE_EDGES, from, event).ok_or_else(|| {
            StateMachineError::InvalidTransition {
                from: from.to_string(),
                requested: event.to_string(),
            }
        })?;

        let actor =
            Actor::load(self.collaborators.repository.as_ref(), self.course_id, user_id).await?;
        let request = GuardRequest {
            actor: &actor,
            event,
        };
        check_guards(&self.guards_for(event), &subject, &request).await?;

        let acting = acting_role(
            event,
            ReviewSides::COURSE,
            subject.state.owner_role,
            &self.collaborators.override_roles,
            &actor.roles,
        )
        .ok_or_else(|| internal_error("role guard passed without an acting role"))?;

        let mut next = subject.state.clone();
        apply_effects(&mut next, event, acting, user_id);
        next.name = to;

        let mut metadata =
            context.to_metadata(Self::WORKFLOW, event, &from.to_string(), &to.to_string());
        metadata["acting_role"] = json!(acting);
        subject.state = self
            .persistence
            .persist_transition(&next, user_id, metadata)
            .await?;

        let transition = CommittedTransition {
            workflow: Self::WORKFLOW,
            record_id: self.course_id,
            from_state: from.to_string(),
            to_state: to.to_string(),
            event,
            user_id,
            acting_role: acting,
        };
        let pending_notifications =
            execute_actions(&self.actions(), &subject, &transition).await;

        Ok(TransitionOutcome {
            from,
            to,
            event,
            pending_notifications,
        })
    }

    fn guards_for(&self, event: WorkflowEvent) -> Vec<Box<dyn StateGuard<CourseSubject>>> {
        let mut guards: Vec<Box<dyn StateGuard<CourseSubject>>> = vec![Box::new(
            ReviewRoleGuard::new(ReviewSides::COURSE, self.collaborators.override_roles.clone()),
        )];
        // Checklist first: a course without organizations has nothing to grant permission on
        if event == WorkflowEvent::SendForReview {
            guards.push(Box::new(CourseReadyForReviewGuard));
        }
        guards.push(Box::new(OrganizationPermissionGuard::new(
            self.collaborators.authorization.clone(),
            EDIT_COURSE,
        )));
        guards
    }

    fn actions(&self) -> Vec<Box<dyn StateAction<CourseSubject>>> {
        vec![
            Box::new(LogTransitionAction),
            Box::new(NotifyAction::new(self.collaborators.dispatcher.clone())),
        ]
    }
}

/// Ownership and approval bookkeeping for a course event
fn apply_effects(
    state: &mut CourseState,
    event: WorkflowEvent,
    acting: PublisherUserRole,
    user_id: i64,
) {
    let sides = ReviewSides::COURSE;
    match event {
        WorkflowEvent::SendForReview => {
            state.owner_role = sides.counterpart(acting).unwrap_or(sides.reviewer);
            if acting == PublisherUserRole::MarketingReviewer {
                state.marketing_reviewed = true;
            }
        }
        WorkflowEvent::Approve => {
            state.approved_by_role = Some(acting);
            state.approved_by_user = Some(user_id);
        }
        WorkflowEvent::Reject => {
            state.owner_role = sides.counterpart(acting).unwrap_or(sides.author);
            state.approved_by_role = None;
            state.approved_by_user = None;
        }
        WorkflowEvent::Reopen => {
            state.owner_role = sides.author;
            state.approved_by_role = None;
            state.approved_by_user = None;
        }
        WorkflowEvent::Publish => {}
    }
}
