use super::{
    actions::{execute_actions, CommittedTransition, LogTransitionAction, NotifyAction, StateAction},
    context::{Actor, TransitionContext, TransitionOutcome, WorkflowCollaborators},
    errors::{internal_error, StateMachineError, StateMachineResult},
    events::WorkflowEvent,
    guards::{
        acting_role, check_guards, course_run_review_blockers, CourseRunReadyForReviewGuard,
        CourseRunSubject, GuardRequest, OrganizationPermissionGuard, PublishMetadataGuard,
        ReviewRoleGuard, StateGuard,
    },
    persistence::{RepositoryPersistence, TransitionPersistence},
    states::CourseRunWorkflowState,
    transitions::{available_events, event_for, target_for, COURSE_RUN_EDGES},
};
use crate::constants::{permissions::EDIT_COURSE_RUN, ReviewSides};
use crate::models::{CourseRunState, PublisherUserRole};
use serde_json::json;
use tracing::instrument;

/// Approval and publishing workflow of a single course run.
///
/// Every committed transition notifies the course users with a
/// `state_changed` email.
pub struct CourseRunStateMachine {
    course_run_id: i64,
    collaborators: WorkflowCollaborators,
    persistence: RepositoryPersistence,
}

impl CourseRunStateMachine {
    pub const WORKFLOW: &'static str = "course_run";

    pub fn new(course_run_id: i64, collaborators: WorkflowCollaborators) -> Self {
        let persistence = RepositoryPersistence::new(collaborators.repository.clone());
        Self {
            course_run_id,
            collaborators,
            persistence,
        }
    }

    pub fn course_run_id(&self) -> i64 {
        self.course_run_id
    }

    pub async fn current_state(&self) -> StateMachineResult<CourseRunWorkflowState> {
        Ok(self.state_record().await?.name)
    }

    pub async fn state_record(&self) -> StateMachineResult<CourseRunState> {
        Ok(self
            .persistence
            .resolve_current_state(self.course_run_id)
            .await?)
    }

    pub async fn available_events(&self) -> StateMachineResult<Vec<WorkflowEvent>> {
        Ok(available_events(COURSE_RUN_EDGES, self.current_state().await?))
    }

    pub async fn review_blockers(&self) -> StateMachineResult<Vec<String>> {
        let repository = &self.collaborators.repository;
        let run = repository.course_run(self.course_run_id).await?;
        let seats = repository.seats(self.course_run_id).await?;
        Ok(course_run_review_blockers(&run, &seats))
    }

    /// Whether the run metadata is complete enough for review. Read-only.
    pub async fn can_send_for_review(&self) -> StateMachineResult<bool> {
        Ok(self.review_blockers().await?.is_empty())
    }

    pub async fn transition(
        &self,
        event: WorkflowEvent,
        user_id: i64,
    ) -> StateMachineResult<TransitionOutcome<CourseRunWorkflowState>> {
        self.transition_with_context(event, user_id, TransitionContext::default())
            .await
    }

    pub async fn transition_with_context(
        &self,
        event: WorkflowEvent,
        user_id: i64,
        context: TransitionContext,
    ) -> StateMachineResult<TransitionOutcome<CourseRunWorkflowState>> {
        let subject = self.load_subject().await?;
        self.execute(subject, event, user_id, &context).await
    }

    pub async fn change_state(
        &self,
        target: CourseRunWorkflowState,
        user_id: i64,
    ) -> StateMachineResult<TransitionOutcome<CourseRunWorkflowState>> {
        self.change_state_with_context(target, user_id, TransitionContext::default())
            .await
    }

    pub async fn change_state_with_context(
        &self,
        target: CourseRunWorkflowState,
        user_id: i64,
        context: TransitionContext,
    ) -> StateMachineResult<TransitionOutcome<CourseRunWorkflowState>> {
        let subject = self.load_subject().await?;
        let from = subject.state.name;
        let event = event_for(COURSE_RUN_EDGES, from, target).ok_or_else(|| {
            StateMachineError::InvalidTransition {
                from: from.to_string(),
                requested: target.to_string(),
            }
        })?;
        self.execute(subject, event, user_id, &context).await
    }

    async fn load_subject(&self) -> StateMachineResult<CourseRunSubject> {
        let repository = &self.collaborators.repository;
        let run = repository.course_run(self.course_run_id).await?;
        let course = repository.course(run.course_id).await?;
        let seats = repository.seats(run.id).await?;
        let state = self
            .persistence
            .resolve_current_state(self.course_run_id)
            .await?;
        Ok(CourseRunSubject {
            run,
            course,
            state,
            seats,
        })
    }

    #[instrument(skip(self, subject, context), fields(course_run_id = self.course_run_id))]
    async fn execute(
        &self,
        mut subject: CourseRunSubject,
        event: WorkflowEvent,
        user_id: i64,
        context: &TransitionContext,
    ) -> StateMachineResult<TransitionOutcome<CourseRunWorkflowState>> {
        let from = subject.state.name;
        let to = target_for(COURSE_RUN_EDGES, from, event).ok_or_else(|| {
            StateMachineError::InvalidTransition {
                from: from.to_string(),
                requested: event.to_string(),
            }
        })?;

        let actor =
            Actor::load(self.collaborators.repository.as_ref(), subject.course.id, user_id).await?;
        let request = GuardRequest {
            actor: &actor,
            event,
        };
        check_guards(&self.guards_for(event), &subject, &request).await?;

        let acting = acting_role(
            event,
            ReviewSides::COURSE_RUN,
            subject.state.owner_role,
            &self.collaborators.override_roles,
            &actor.roles,
        )
        .ok_or_else(|| internal_error("role guard passed without an acting role"))?;

        let mut next = subject.state.clone();
        apply_effects(&mut next, event, acting);
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
            record_id: self.course_run_id,
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

    fn guards_for(&self, event: WorkflowEvent) -> Vec<Box<dyn StateGuard<CourseRunSubject>>> {
        let mut guards: Vec<Box<dyn StateGuard<CourseRunSubject>>> = vec![Box::new(
            ReviewRoleGuard::new(
                ReviewSides::COURSE_RUN,
                self.collaborators.override_roles.clone(),
            ),
        )];
        match event {
            WorkflowEvent::SendForReview => guards.push(Box::new(CourseRunReadyForReviewGuard)),
            WorkflowEvent::Publish => guards.push(Box::new(PublishMetadataGuard)),
            _ => {}
        }
        guards.push(Box::new(OrganizationPermissionGuard::new(
            self.collaborators.authorization.clone(),
            EDIT_COURSE_RUN,
        )));
        guards
    }

    fn actions(&self) -> Vec<Box<dyn StateAction<CourseRunSubject>>> {
        vec![
            Box::new(LogTransitionAction),
            Box::new(NotifyAction::new(self.collaborators.dispatcher.clone())),
        ]
    }
}

fn apply_effects(state: &mut CourseRunState, event: WorkflowEvent, acting: PublisherUserRole) {
    let sides = ReviewSides::COURSE_RUN;
    match event {
        WorkflowEvent::SendForReview => {
            state.owner_role = sides.counterpart(acting).unwrap_or(sides.reviewer);
        }
        WorkflowEvent::Approve => state.approved_by_role = Some(acting),
        WorkflowEvent::Reject => {
            state.owner_role = sides.counterpart(acting).unwrap_or(sides.author);
            state.approved_by_role = None;
        }
        WorkflowEvent::Reopen => {
            state.owner_role = sides.author;
            state.approved_by_role = None;
        }
        // Publishing keeps the approval attribution
        WorkflowEvent::Publish => {}
    }
}
