use crate::factories::{CourseFactory, CourseRunFactory, PublisherWorld};
use course_publisher::config::PublisherConfig;
use course_publisher::models::PublisherUserRole;
use course_publisher::state_machine::{CourseRunWorkflowState, StateMachineError, WorkflowEvent};

#[tokio::test]
async fn test_full_run_lifecycle() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let run = CourseRunFactory::new().create(&world, &course).await;
    let machine = world.service.course_run_state_machine(run.id);
    world.mailer.clear();

    let mut outcome = machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap();
    outcome.settle().await;
    let state = machine.state_record().await.unwrap();
    assert_eq!(state.name, CourseRunWorkflowState::Review);
    assert_eq!(state.owner_role, PublisherUserRole::PartnerCoordinator);

    let mut outcome = machine
        .transition(WorkflowEvent::Approve, world.coordinator.id)
        .await
        .unwrap();
    outcome.settle().await;
    let state = machine.state_record().await.unwrap();
    assert_eq!(
        state.approved_by_role,
        Some(PublisherUserRole::PartnerCoordinator)
    );

    let err = machine
        .transition(WorkflowEvent::Publish, world.publisher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StateMachineError::TransitionNotAllowed { .. }));
    assert_eq!(err.failed_preconditions(), ["lms_course_id"]);

    world
        .service
        .update_studio_instance(run.id, "course-v1:RustX+RS101+2026", world.coordinator.id)
        .await
        .unwrap()
        .settle()
        .await;

    let mut outcome = machine
        .change_state(CourseRunWorkflowState::Published, world.publisher.id)
        .await
        .unwrap();
    outcome.settle().await;
    assert_eq!(outcome.event, WorkflowEvent::Publish);
    assert!(machine.state_record().await.unwrap().is_published());

    let mut outcome = machine
        .transition(WorkflowEvent::Reopen, world.course_team.id)
        .await
        .unwrap();
    outcome.settle().await;
    let state = machine.state_record().await.unwrap();
    assert_eq!(state.name, CourseRunWorkflowState::Draft);
    assert_eq!(state.approved_by_role, None);

    // One state change email per transition, plus the studio notice
    let subjects: Vec<String> = world
        .mailer
        .outbox()
        .into_iter()
        .map(|message| message.subject)
        .collect();
    let state_changes = subjects
        .iter()
        .filter(|s| s.ends_with("state has been changed."))
        .count();
    assert_eq!(state_changes, 4);
    assert!(subjects.contains(&"Studio instance created".to_string()));
}

#[tokio::test]
async fn test_run_checklist_names_every_failure() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let run = CourseRunFactory::new()
        .without_seats()
        .ending_before_start()
        .with_effort(6, 2)
        .create(&world, &course)
        .await;
    let machine = world.service.course_run_state_machine(run.id);

    assert!(!machine.can_send_for_review().await.unwrap());
    let err = machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap_err();

    assert_eq!(
        err.failed_preconditions(),
        [
            "seats",
            "end must be after start",
            "min_effort must not exceed max_effort"
        ]
    );
    assert_eq!(
        machine.current_state().await.unwrap(),
        CourseRunWorkflowState::Draft
    );
}

#[tokio::test]
async fn test_missing_start_blocks_review() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let run = CourseRunFactory::new()
        .without_start()
        .create(&world, &course)
        .await;

    let blockers = world
        .service
        .course_run_state_machine(run.id)
        .review_blockers()
        .await
        .unwrap();
    assert_eq!(blockers, vec!["start".to_string()]);
}

#[tokio::test]
async fn test_only_publisher_may_publish() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let run = CourseRunFactory::new()
        .with_lms_course_id("course-v1:RustX+RS101+2026")
        .create(&world, &course)
        .await;
    let machine = world.service.course_run_state_machine(run.id);

    machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap();
    machine
        .transition(WorkflowEvent::Approve, world.coordinator.id)
        .await
        .unwrap();

    let err = machine
        .transition(WorkflowEvent::Publish, world.coordinator.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StateMachineError::PermissionDenied { .. }));
    assert_eq!(
        machine.current_state().await.unwrap(),
        CourseRunWorkflowState::Approved
    );
}

#[tokio::test]
async fn test_published_is_not_reachable_from_draft() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let run = CourseRunFactory::new()
        .with_lms_course_id("course-v1:RustX+RS101+2026")
        .create(&world, &course)
        .await;

    let err = world
        .service
        .course_run_state_machine(run.id)
        .change_state(CourseRunWorkflowState::Published, world.publisher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StateMachineError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_override_roles_come_from_configuration() {
    let mut config = PublisherConfig::default();
    config.workflow.override_roles.clear();
    let world = PublisherWorld::with_config(config).await;
    let course = CourseFactory::new().create(&world).await;
    let run = CourseRunFactory::new().create(&world, &course).await;
    let machine = world.service.course_run_state_machine(run.id);

    machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap();

    let err = machine
        .transition(WorkflowEvent::Approve, world.publisher.id)
        .await
        .unwrap_err();
    assert!(matches!(err, StateMachineError::PermissionDenied { .. }));

    machine
        .transition(WorkflowEvent::Reject, world.coordinator.id)
        .await
        .unwrap();
    let state = machine.state_record().await.unwrap();
    assert_eq!(state.name, CourseRunWorkflowState::Draft);
    assert_eq!(state.owner_role, PublisherUserRole::CourseTeam);
}

#[tokio::test]
async fn test_available_events_follow_the_edge_table() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let run = CourseRunFactory::new().create(&world, &course).await;
    let machine = world.service.course_run_state_machine(run.id);

    assert_eq!(
        machine.available_events().await.unwrap(),
        vec![WorkflowEvent::SendForReview]
    );

    machine
        .transition(WorkflowEvent::SendForReview, world.course_team.id)
        .await
        .unwrap();
    assert_eq!(
        machine.available_events().await.unwrap(),
        vec![WorkflowEvent::Reject, WorkflowEvent::Approve]
    );
}
