use super::history::{EntityRef, HistoryRecord};
use crate::models::{
    Course, CourseRun, CourseRunState, CourseState, CourseUserRole, NewCourse, NewCourseRun,
    Organization, OrganizationExtension, OrganizationUserRole, Partner, PublisherUserRole, Seat,
    User, UserAttribute,
};
use crate::state_machine::errors::PersistenceResult;
use async_trait::async_trait;
use serde_json::Value;

/// Storage seam for the publishing workflow.
///
/// Saves are single-record atomic commits. State saves are versioned: the
/// caller passes the record it loaded, and the save is refused with
/// `ConcurrentModification` if another writer committed in between.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    // Accounts and organizations

    async fn user(&self, user_id: i64) -> PersistenceResult<User>;

    async fn user_attribute(&self, user_id: i64) -> PersistenceResult<Option<UserAttribute>>;

    async fn organization(&self, organization_id: i64) -> PersistenceResult<Organization>;

    async fn partner(&self, partner_id: i64) -> PersistenceResult<Partner>;

    async fn organization_extension(
        &self,
        organization_id: i64,
    ) -> PersistenceResult<Option<OrganizationExtension>>;

    // Courses, runs and seats

    /// Create a course together with its `Draft` state record.
    async fn create_course(
        &self,
        new_course: NewCourse,
        owner_role: PublisherUserRole,
        actor: Option<i64>,
    ) -> PersistenceResult<Course>;

    async fn course(&self, course_id: i64) -> PersistenceResult<Course>;

    async fn save_course(&self, course: &Course, actor: Option<i64>) -> PersistenceResult<Course>;

    /// Create a run together with its `Draft` state record.
    async fn create_course_run(
        &self,
        new_run: NewCourseRun,
        owner_role: PublisherUserRole,
        actor: Option<i64>,
    ) -> PersistenceResult<CourseRun>;

    async fn course_run(&self, course_run_id: i64) -> PersistenceResult<CourseRun>;

    async fn course_runs(&self, course_id: i64) -> PersistenceResult<Vec<CourseRun>>;

    async fn save_course_run(
        &self,
        course_run: &CourseRun,
        actor: Option<i64>,
    ) -> PersistenceResult<CourseRun>;

    async fn add_seat(&self, seat: Seat, actor: Option<i64>) -> PersistenceResult<Seat>;

    async fn seats(&self, course_run_id: i64) -> PersistenceResult<Vec<Seat>>;

    // Workflow state records

    async fn course_state(&self, course_id: i64) -> PersistenceResult<CourseState>;

    /// Versioned save; returns the committed record with its new version.
    async fn save_course_state(
        &self,
        state: &CourseState,
        actor: Option<i64>,
        metadata: Option<Value>,
    ) -> PersistenceResult<CourseState>;

    async fn course_run_state(&self, course_run_id: i64) -> PersistenceResult<CourseRunState>;

    async fn save_course_run_state(
        &self,
        state: &CourseRunState,
        actor: Option<i64>,
        metadata: Option<Value>,
    ) -> PersistenceResult<CourseRunState>;

    // Roles

    /// Get-or-create a course role. Returns `created = false` when `user_id`
    /// already holds `role`; a different holder is a constraint violation.
    async fn add_course_role(
        &self,
        course_id: i64,
        role: PublisherUserRole,
        user_id: i64,
    ) -> PersistenceResult<(CourseUserRole, bool)>;

    /// Course roles in creation order.
    async fn course_user_roles(&self, course_id: i64) -> PersistenceResult<Vec<CourseUserRole>>;

    async fn add_organization_role(
        &self,
        organization_id: i64,
        role: PublisherUserRole,
        user_id: i64,
    ) -> PersistenceResult<OrganizationUserRole>;

    async fn organization_user_roles(
        &self,
        organization_id: i64,
    ) -> PersistenceResult<Vec<OrganizationUserRole>>;

    // Audit trail

    /// History rows for `entity`, oldest first.
    async fn history(&self, entity: EntityRef) -> PersistenceResult<Vec<HistoryRecord>>;

    // Derived queries

    /// Roles `user_id` holds on the course.
    async fn roles_for_user(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> PersistenceResult<Vec<PublisherUserRole>> {
        Ok(self
            .course_user_roles(course_id)
            .await?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.role)
            .collect())
    }

    /// Holder of `role` on the course, if any.
    async fn user_for_role(
        &self,
        course_id: i64,
        role: PublisherUserRole,
    ) -> PersistenceResult<Option<User>> {
        let holder = self
            .course_user_roles(course_id)
            .await?
            .into_iter()
            .find(|r| r.role == role);

        match holder {
            Some(r) => Ok(Some(self.user(r.user_id).await?)),
            None => Ok(None),
        }
    }

    /// Copy the organization's default roles onto the course, except
    /// `CourseTeam`, which is always chosen per course.
    async fn assign_organization_roles(
        &self,
        course_id: i64,
        organization_id: i64,
    ) -> PersistenceResult<Vec<CourseUserRole>> {
        let mut assigned = Vec::new();
        for default_role in self.organization_user_roles(organization_id).await? {
            if default_role.role == PublisherUserRole::CourseTeam {
                continue;
            }
            let (role, _) = self
                .add_course_role(course_id, default_role.role, default_role.user_id)
                .await?;
            assigned.push(role);
        }
        Ok(assigned)
    }

    /// Emails of everyone holding a role on the course, in role creation
    /// order, skipping users who disabled email notifications.
    async fn course_users_emails(&self, course_id: i64) -> PersistenceResult<Vec<String>> {
        let mut emails: Vec<String> = Vec::new();
        for role in self.course_user_roles(course_id).await? {
            let enabled = self
                .user_attribute(role.user_id)
                .await?
                .map(|attr| attr.enable_email_notification)
                .unwrap_or(true);
            if !enabled {
                continue;
            }
            let user = self.user(role.user_id).await?;
            if !emails.contains(&user.email) {
                emails.push(user.email);
            }
        }
        Ok(emails)
    }

    /// Partner owning the course's first organization.
    async fn course_partner(&self, course_id: i64) -> PersistenceResult<Option<Partner>> {
        let course = self.course(course_id).await?;
        match course.primary_organization_id() {
            Some(organization_id) => {
                let organization = self.organization(organization_id).await?;
                Ok(Some(self.partner(organization.partner_id).await?))
            }
            None => Ok(None),
        }
    }

    /// The user recorded on the run's first history row.
    async fn course_run_created_by(&self, course_run_id: i64) -> PersistenceResult<Option<User>> {
        let first = self
            .history(EntityRef::CourseRun(course_run_id))
            .await?
            .into_iter()
            .next();

        match first.and_then(|h| h.history_user) {
            Some(user_id) => Ok(Some(self.user(user_id).await?)),
            None => Ok(None),
        }
    }
}
