use crate::factories::{CourseFactory, PublisherWorld};
use course_publisher::models::PublisherUserRole;
use course_publisher::state_machine::{
    CourseWorkflowState, StateMachineError, TransitionContext, WorkflowEvent,
};
use course_publisher::store::{EntityRef, WorkflowRepository};
use uuid::Uuid;

#[tokio::test]
async fn test_send_for_review_requires_complete_metadata() {
    let world = PublisherWorld::new().await;
    let mut course = CourseFactory::new().create(&world).await;
    course.title = String::new();
    course.image = None;
    world.repository.save_course(&course, None).await.unwrap();

    let machine = world.service.course_state_machine(course.id);
    let err = machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap_err();

    assert!(matches!(err, StateMachineError::TransitionNotAllowed { .. }));
    assert_eq!(err.failed_preconditions(), ["title", "image"]);
    assert_eq!(machine.current_state().await.unwrap(), CourseWorkflowState::Draft);

    course.title = "Intro to X".to_string();
    course.image = Some("images/x.png".to_string());
    world.repository.save_course(&course, None).await.unwrap();

    let mut outcome = machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap();
    outcome.settle().await;

    assert_eq!(outcome.to, CourseWorkflowState::Review);
    let state = machine.state_record().await.unwrap();
    assert_eq!(state.name, CourseWorkflowState::Review);
    assert_eq!(state.owner_role, PublisherUserRole::MarketingReviewer);
}

#[tokio::test]
async fn test_can_send_for_review_is_idempotent() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().without_description().create(&world).await;
    let machine = world.service.course_state_machine(course.id);
    let history_before = world.repository.history_len();

    let first = machine.can_send_for_review().await.unwrap();
    let second = machine.can_send_for_review().await.unwrap();

    assert!(!first);
    assert_eq!(first, second);
    assert_eq!(
        machine.review_blockers().await.unwrap(),
        vec!["full_description".to_string()]
    );
    assert_eq!(world.repository.history_len(), history_before);
}

#[tokio::test]
async fn test_invalid_transitions_leave_state_unchanged() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let machine = world.service.course_state_machine(course.id);

    let err = machine
        .transition(WorkflowEvent::Approve, world.marketing.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StateMachineError::InvalidTransition { .. }));
    assert!(!err.is_recoverable());

    let err = machine
        .change_state(CourseWorkflowState::Approved, world.marketing.id)
        .await
        .unwrap_err();
    match err {
        StateMachineError::InvalidTransition { from, requested } => {
            assert_eq!(from, "draft");
            assert_eq!(requested, "approved");
        }
        other => panic!("Expected InvalidTransition, got {other:?}"),
    }

    let err = machine
        .transition(WorkflowEvent::Publish, world.publisher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StateMachineError::InvalidTransition { .. }));

    let state = machine.state_record().await.unwrap();
    assert_eq!(state.name, CourseWorkflowState::Draft);
    assert_eq!(state.version, 0);
}

#[tokio::test]
async fn test_unauthorized_approval_is_denied() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let machine = world.service.course_state_machine(course.id);
    machine
        .change_state(CourseWorkflowState::Review, world.course_team.id)
        .await
        .unwrap();

    let err = machine
        .change_state(CourseWorkflowState::Approved, world.course_team.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StateMachineError::PermissionDenied { .. }));

    let err = machine
        .transition(WorkflowEvent::Approve, world.outsider.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StateMachineError::PermissionDenied { .. }));

    assert_eq!(machine.current_state().await.unwrap(), CourseWorkflowState::Review);
}

#[tokio::test]
async fn test_missing_organization_permission_is_denied() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    world
        .permissions
        .remove_user_from_group(world.course_team.id, world.group.id);

    let err = world
        .service
        .course_state_machine(course.id)
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap_err();

    match err {
        StateMachineError::PermissionDenied { user_id, reason } => {
            assert_eq!(user_id, world.course_team.id);
            assert!(reason.contains("publisher_edit_course"));
        }
        other => panic!("Expected PermissionDenied, got {other:?}"),
    }
}

#[tokio::test]
async fn test_course_without_organization_names_the_checklist_item() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new()
        .without_organization()
        .create(&world)
        .await;
    let machine = world.service.course_state_machine(course.id);

    assert_eq!(machine.review_blockers().await.unwrap(), ["organizations"]);

    let err = machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap_err();

    assert!(matches!(err, StateMachineError::TransitionNotAllowed { .. }));
    assert_eq!(err.failed_preconditions(), ["organizations"]);
    assert_eq!(machine.current_state().await.unwrap(), CourseWorkflowState::Draft);
}

#[tokio::test]
async fn test_reapproval_stamps_new_approver() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let machine = world.service.course_state_machine(course.id);

    machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap();
    machine
        .transition(WorkflowEvent::Approve, world.marketing.id)
        .await
        .unwrap();
    let first = machine.state_record().await.unwrap();
    assert_eq!(first.approved_by_user, Some(world.marketing.id));
    assert_eq!(
        first.approved_by_role,
        Some(PublisherUserRole::MarketingReviewer)
    );

    machine
        .transition(WorkflowEvent::Reopen, world.course_team.id)
        .await
        .unwrap();
    let reopened = machine.state_record().await.unwrap();
    assert_eq!(reopened.name, CourseWorkflowState::Draft);
    assert_eq!(reopened.approved_by_user, None);

    machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap();
    machine
        .transition(WorkflowEvent::Approve, world.publisher.id)
        .await
        .unwrap();

    let second = machine.state_record().await.unwrap();
    assert_eq!(second.name, CourseWorkflowState::Approved);
    assert_eq!(second.approved_by_user, Some(world.publisher.id));
    assert_eq!(second.approved_by_role, Some(PublisherUserRole::Publisher));
    assert_ne!(second.approved_by_user, first.approved_by_user);
}

#[tokio::test]
async fn test_reject_returns_to_draft_for_course_team() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let machine = world.service.course_state_machine(course.id);

    machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap();
    let outcome = machine
        .transition(WorkflowEvent::Reject, world.marketing.id)
        .await
        .unwrap();

    assert_eq!(outcome.from, CourseWorkflowState::Review);
    assert_eq!(outcome.to, CourseWorkflowState::Draft);
    let state = machine.state_record().await.unwrap();
    assert_eq!(state.owner_role, PublisherUserRole::CourseTeam);
}

#[tokio::test]
async fn test_marketing_review_hands_back_to_course_team() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let machine = world.service.course_state_machine(course.id);
    world.mailer.clear();

    let mut outcome = machine
        .transition(WorkflowEvent::SendForReview, world.marketing.id)
        .await
        .unwrap();
    outcome.settle().await;

    let state = machine.state_record().await.unwrap();
    assert!(state.marketing_reviewed);
    assert_eq!(state.owner_role, PublisherUserRole::CourseTeam);

    let outbox = world.mailer.outbox();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].to, vec![world.course_team.email.clone()]);
}

#[tokio::test]
async fn test_notification_failure_does_not_roll_back() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    world.mailer.clear();
    world.mailer.fail_deliveries(true);

    let machine = world.service.course_state_machine(course.id);
    let mut outcome = machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap();
    outcome.settle().await;

    assert_eq!(machine.current_state().await.unwrap(), CourseWorkflowState::Review);
    assert!(world.mailer.outbox().is_empty());
}

#[tokio::test]
async fn test_transition_is_recorded_in_history() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let correlation_id = Uuid::new_v4();

    world
        .service
        .course_state_machine(course.id)
        .transition_with_context(
            WorkflowEvent::SendForReview,
            world.course_team.id,
            TransitionContext::new()
                .with_correlation_id(correlation_id)
                .with_note("ready"),
        )
        .await
        .unwrap();

    let history = world
        .repository
        .history(EntityRef::CourseState(course.id))
        .await
        .unwrap();
    let last = history.last().unwrap();

    assert_eq!(last.history_user, Some(world.course_team.id));
    assert_eq!(last.snapshot["record"]["name"], "review");
    assert_eq!(last.snapshot["metadata"]["event"], "send_for_review");
    assert_eq!(last.snapshot["metadata"]["acting_role"], "course_team");
    assert_eq!(
        last.snapshot["metadata"]["correlation_id"],
        correlation_id.to_string()
    );
    assert_eq!(last.snapshot["metadata"]["note"], "ready");
}

#[tokio::test]
async fn test_stale_machines_cannot_double_commit() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let stale = world.repository.course_state(course.id).await.unwrap();

    world
        .service
        .course_state_machine(course.id)
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap();

    let err = world
        .repository
        .save_course_state(&stale, Some(world.course_team.id), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        course_publisher::state_machine::PersistenceError::ConcurrentModification { .. }
    ));
}
