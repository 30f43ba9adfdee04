use crate::factories::{CourseFactory, CourseRunFactory, PublisherWorld};
use course_publisher::models::{NewCourse, NewCourseRun, PublisherUserRole};
use course_publisher::state_machine::{CourseRunWorkflowState, CourseWorkflowState};
use course_publisher::store::{EntityRef, WorkflowRepository};
use course_publisher::PublisherError;

#[tokio::test]
async fn test_create_course_starts_in_draft() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;

    let state = world.repository.course_state(course.id).await.unwrap();
    assert_eq!(state.name, CourseWorkflowState::Draft);
    assert_eq!(state.owner_role, PublisherUserRole::CourseTeam);
    assert_eq!(state.approved_by_role, None);
    assert!(!state.marketing_reviewed);

    let history = world
        .repository
        .history(EntityRef::Course(course.id))
        .await
        .unwrap();
    assert_eq!(history[0].history_user, Some(world.course_team.id));
}

#[tokio::test]
async fn test_create_course_rejects_blank_title() {
    let world = PublisherWorld::new().await;
    let err = world
        .service
        .create_course(NewCourse::default(), world.course_team.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PublisherError::Validation(_)));
}

#[tokio::test]
async fn test_create_course_run_for_unknown_course_fails() {
    let world = PublisherWorld::new().await;
    let err = world
        .service
        .create_course_run(
            NewCourseRun {
                course_id: 4242,
                ..Default::default()
            },
            world.course_team.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PublisherError::Persistence(_)));
}

#[tokio::test]
async fn test_run_state_starts_in_draft() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let run = CourseRunFactory::new().create(&world, &course).await;

    let state = world.repository.course_run_state(run.id).await.unwrap();
    assert_eq!(state.name, CourseRunWorkflowState::Draft);
    assert_eq!(state.owner_role, PublisherUserRole::CourseTeam);
}

#[tokio::test]
async fn test_studio_instance_requires_coordinator() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let run = CourseRunFactory::new().create(&world, &course).await;

    let err = world
        .service
        .update_studio_instance(run.id, "course-v1:RustX+RS101+2026", world.course_team.id)
        .await
        .unwrap_err();
    assert!(err.is_permission_denied());

    let err = world
        .service
        .update_studio_instance(run.id, "   ", world.coordinator.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PublisherError::Validation(_)));

    let run = world
        .service
        .update_studio_instance(run.id, "course-v1:RustX+RS101+2026", world.publisher.id)
        .await
        .unwrap()
        .settle()
        .await;
    assert_eq!(
        run.lms_course_id.as_deref(),
        Some("course-v1:RustX+RS101+2026")
    );
}
