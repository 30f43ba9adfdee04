use crate::factories::{CourseFactory, CourseRunFactory, PublisherWorld};
use course_publisher::models::PublisherUserRole;
use course_publisher::state_machine::PersistenceError;
use course_publisher::store::WorkflowRepository;

#[tokio::test]
async fn test_course_role_is_unique_per_course() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;

    // Same holder again is a no-op
    let (_, created) = world
        .repository
        .add_course_role(course.id, PublisherUserRole::CourseTeam, world.course_team.id)
        .await
        .unwrap();
    assert!(!created);

    let err = world
        .repository
        .add_course_role(course.id, PublisherUserRole::CourseTeam, world.outsider.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::ConstraintViolation { .. }));
}

#[tokio::test]
async fn test_organization_role_is_unique_per_organization() {
    let world = PublisherWorld::new().await;

    let err = world
        .repository
        .add_organization_role(
            world.organization.id,
            PublisherUserRole::MarketingReviewer,
            world.outsider.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PersistenceError::ConstraintViolation { .. }));
}

#[tokio::test]
async fn test_new_course_inherits_organization_roles() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;

    let roles: Vec<PublisherUserRole> = world
        .repository
        .course_user_roles(course.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.role)
        .collect();
    assert_eq!(
        roles,
        vec![
            PublisherUserRole::CourseTeam,
            PublisherUserRole::MarketingReviewer,
            PublisherUserRole::PartnerCoordinator,
            PublisherUserRole::Publisher,
        ]
    );

    let reviewer = world
        .repository
        .user_for_role(course.id, PublisherUserRole::MarketingReviewer)
        .await
        .unwrap();
    assert_eq!(reviewer.map(|u| u.id), Some(world.marketing.id));
}

#[tokio::test]
async fn test_organization_course_team_role_is_not_copied() {
    let world = PublisherWorld::new().await;
    world
        .repository
        .add_organization_role(
            world.organization.id,
            PublisherUserRole::CourseTeam,
            world.outsider.id,
        )
        .await
        .unwrap();

    let course = CourseFactory::new().create(&world).await;
    let team = world
        .repository
        .user_for_role(course.id, PublisherUserRole::CourseTeam)
        .await
        .unwrap();
    assert_eq!(team.map(|u| u.id), Some(world.course_team.id));
}

#[tokio::test]
async fn test_run_creator_comes_from_history() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let run = CourseRunFactory::new().create(&world, &course).await;

    let creator = world.repository.course_run_created_by(run.id).await.unwrap();
    assert_eq!(creator.map(|u| u.id), Some(world.course_team.id));

    let partner = world.repository.course_partner(course.id).await.unwrap();
    assert_eq!(partner.map(|p| p.short_code), Some("openlearn".to_string()));
}

#[tokio::test]
async fn test_organization_extension_is_one_to_one() {
    let world = PublisherWorld::new().await;
    let other_group = world.repository.create_group("Another group");

    let err = world
        .repository
        .create_organization_extension(world.organization.id, other_group.id)
        .unwrap_err();
    assert!(matches!(err, PersistenceError::ConstraintViolation { .. }));
}
