use crate::factories::{CourseFactory, PublisherWorld};
use course_publisher::constants::permissions::{EDIT_COURSE, VIEW_COURSE};
use course_publisher::models::User;
use course_publisher::permissions::{AuthorizationBackend, ResourceRef};

#[tokio::test]
async fn test_group_grants_apply_through_course_organization() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;

    assert!(world
        .permissions
        .check_course_organization_permission(&world.outsider, course.id, EDIT_COURSE)
        .await
        .unwrap());

    world
        .permissions
        .remove_perm(EDIT_COURSE, world.group.id, &world.extension);
    assert!(!world
        .permissions
        .check_course_organization_permission(&world.outsider, course.id, EDIT_COURSE)
        .await
        .unwrap());
    assert!(world
        .permissions
        .has_permission(&world.outsider, ResourceRef::Course(course.id), VIEW_COURSE)
        .await);
}

#[tokio::test]
async fn test_courses_without_organization_grant_nothing() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().without_organization().create(&world).await;

    assert!(!world
        .permissions
        .has_permission(&world.course_team, ResourceRef::Course(course.id), VIEW_COURSE)
        .await);
}

#[tokio::test]
async fn test_superuser_holds_every_permission() {
    let world = PublisherWorld::new().await;
    let course = CourseFactory::new().create(&world).await;
    let admin = world.repository.create_user("admin", "admin@example.com");
    let admin = world
        .repository
        .update_user(User {
            is_superuser: true,
            ..admin
        })
        .unwrap();

    assert!(world
        .permissions
        .has_permission(&admin, ResourceRef::Course(course.id), EDIT_COURSE)
        .await);
    assert!(world
        .permissions
        .has_permission(&admin, ResourceRef::Organization(world.organization.id), EDIT_COURSE)
        .await);
}
