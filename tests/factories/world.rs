use course_publisher::config::PublisherConfig;
use course_publisher::constants::permissions;
use course_publisher::models::{
    Group, Organization, OrganizationExtension, PublisherUserRole, User,
};
use course_publisher::notifications::InMemoryMailer;
use course_publisher::permissions::GroupPermissionBackend;
use course_publisher::services::PublisherService;
use course_publisher::store::{InMemoryRepository, WorkflowRepository};
use std::sync::Arc;

/// One organization, its permission group and a user per role
pub struct PublisherWorld {
    pub repository: Arc<InMemoryRepository>,
    pub mailer: Arc<InMemoryMailer>,
    pub permissions: Arc<GroupPermissionBackend>,
    pub service: PublisherService,
    pub organization: Organization,
    pub group: Group,
    pub extension: OrganizationExtension,
    pub course_team: User,
    pub marketing: User,
    pub coordinator: User,
    pub publisher: User,
    /// Group member without any course role
    pub outsider: User,
}

impl PublisherWorld {
    pub async fn new() -> Self {
        Self::with_config(PublisherConfig::default()).await
    }

    pub async fn with_config(config: PublisherConfig) -> Self {
        let repository = Arc::new(InMemoryRepository::new());
        let mailer = Arc::new(InMemoryMailer::new());
        let permissions = Arc::new(GroupPermissionBackend::new(repository.clone()));

        let partner = repository.create_partner("Open Learning", "openlearn", Some("https://studio.example.com"));
        let organization = repository
            .create_organization("RustX", "Rust University", partner.id)
            .expect("organization");
        let group = repository.create_group("RustX course team");
        let extension = repository
            .create_organization_extension(organization.id, group.id)
            .expect("organization extension");
        for permission in permissions::ALL {
            permissions.assign_perm(permission, group.id, &extension);
        }

        let course_team = repository.create_user("team", "team@example.com");
        let marketing = repository.create_user("marketing", "marketing@example.com");
        let coordinator = repository.create_user("coordinator", "pc@example.com");
        let publisher = repository.create_user("publisher", "publisher-user@example.com");
        let outsider = repository.create_user("outsider", "outsider@example.com");
        for user in [&course_team, &marketing, &coordinator, &publisher, &outsider] {
            permissions.add_user_to_group(user.id, group.id);
        }

        for (role, user) in [
            (PublisherUserRole::MarketingReviewer, &marketing),
            (PublisherUserRole::PartnerCoordinator, &coordinator),
            (PublisherUserRole::Publisher, &publisher),
        ] {
            repository
                .add_organization_role(organization.id, role, user.id)
                .await
                .expect("organization role");
        }

        let service = PublisherService::with_mailer(
            config,
            repository.clone(),
            permissions.clone(),
            mailer.clone(),
        );

        Self {
            repository,
            mailer,
            permissions,
            service,
            organization,
            group,
            extension,
            course_team,
            marketing,
            coordinator,
            publisher,
            outsider,
        }
    }
}
