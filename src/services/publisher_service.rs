use crate::config::PublisherConfig;
use crate::error::{PublisherError, PublisherResult};
use crate::models::{Course, CourseRun, NewCourse, NewCourseRun, PublisherUserRole};
use crate::notifications::{
    EmailNotifier, Mailer, NotificationDispatcher, NotificationEvent, Notifier,
};
use crate::permissions::AuthorizationBackend;
use crate::state_machine::{
    CourseRunStateMachine, CourseStateMachine, StateMachineError, WorkflowCollaborators,
};
use crate::store::WorkflowRepository;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Entry point tying the repository, authorization, notifications and
/// configuration together.
///
/// Record creation and studio linking live here; workflow moves go through
/// the state machines handed out by [`course_state_machine`] and
/// [`course_run_state_machine`].
///
/// [`course_state_machine`]: PublisherService::course_state_machine
/// [`course_run_state_machine`]: PublisherService::course_run_state_machine
#[derive(Debug, Clone)]
pub struct PublisherService {
    config: PublisherConfig,
    collaborators: WorkflowCollaborators,
}

/// A created or updated record plus notifications still in flight
#[derive(Debug)]
pub struct ServiceOutcome<T> {
    pub value: T,
    pub pending_notifications: Vec<JoinHandle<()>>,
}

impl<T> ServiceOutcome<T> {
    fn new(value: T, pending: Option<JoinHandle<()>>) -> Self {
        Self {
            value,
            pending_notifications: pending.into_iter().collect(),
        }
    }

    /// Wait for dispatched notifications, then return the value.
    pub async fn settle(self) -> T {
        for handle in self.pending_notifications {
            if let Err(e) = handle.await {
                warn!(error = %e, "Notification task did not complete");
            }
        }
        self.value
    }
}

impl PublisherService {
    pub fn new(
        config: PublisherConfig,
        repository: Arc<dyn WorkflowRepository>,
        authorization: Arc<dyn AuthorizationBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let dispatcher = NotificationDispatcher::new(notifier, config.notifications.enabled);
        let collaborators =
            WorkflowCollaborators::new(repository, authorization, dispatcher, &config);
        Self {
            config,
            collaborators,
        }
    }

    /// Service sending email through `mailer`
    pub fn with_mailer(
        config: PublisherConfig,
        repository: Arc<dyn WorkflowRepository>,
        authorization: Arc<dyn AuthorizationBackend>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let notifier = Arc::new(EmailNotifier::new(
            repository.clone(),
            mailer,
            &config.notifications,
        ));
        Self::new(config, repository, authorization, notifier)
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn repository(&self) -> &Arc<dyn WorkflowRepository> {
        &self.collaborators.repository
    }

    /// Create a course in draft, owned by the course team.
    ///
    /// The creator becomes the course team member, and the default roles of
    /// the course's first organization are copied onto the course.
    pub async fn create_course(
        &self,
        new_course: NewCourse,
        creator_id: i64,
    ) -> PublisherResult<Course> {
        if new_course.title.trim().is_empty() {
            return Err(PublisherError::Validation(
                "course title must not be empty".to_string(),
            ));
        }

        let repository = self.repository();
        repository.user(creator_id).await?;

        let course = repository
            .create_course(new_course, PublisherUserRole::CourseTeam, Some(creator_id))
            .await?;
        repository
            .add_course_role(course.id, PublisherUserRole::CourseTeam, creator_id)
            .await?;

        if let Some(organization_id) = course.primary_organization_id() {
            let assigned = repository
                .assign_organization_roles(course.id, organization_id)
                .await?;
            info!(
                course_id = course.id,
                organization_id,
                roles_assigned = assigned.len(),
                "Organization roles copied onto course"
            );
        }

        info!(course_id = course.id, creator_id, "📘 Course created");
        Ok(course)
    }

    /// Create a run in draft and announce the studio instance request.
    pub async fn create_course_run(
        &self,
        new_run: NewCourseRun,
        creator_id: i64,
    ) -> PublisherResult<ServiceOutcome<CourseRun>> {
        let repository = self.repository();
        repository.user(creator_id).await?;
        let course = repository.course(new_run.course_id).await?;

        let run = repository
            .create_course_run(new_run, PublisherUserRole::CourseTeam, Some(creator_id))
            .await?;

        let pending = self
            .collaborators
            .dispatcher
            .dispatch(NotificationEvent::CourseCreated {
                course_id: course.id,
                course_run_id: run.id,
            });

        info!(course_id = course.id, course_run_id = run.id, "📗 Course run created");
        Ok(ServiceOutcome::new(run, pending))
    }

    /// Record the studio identifier of a run.
    ///
    /// Only the partner coordinator or an override role may link a run. The
    /// notification says "updated" when the run already had an identifier.
    pub async fn update_studio_instance(
        &self,
        course_run_id: i64,
        lms_course_id: &str,
        user_id: i64,
    ) -> PublisherResult<ServiceOutcome<CourseRun>> {
        let lms_course_id = lms_course_id.trim();
        if lms_course_id.is_empty() {
            return Err(PublisherError::Validation(
                "lms_course_id must not be empty".to_string(),
            ));
        }

        let repository = self.repository();
        let mut run = repository.course_run(course_run_id).await?;
        let roles = repository.roles_for_user(run.course_id, user_id).await?;
        let permitted = roles.iter().any(|role| {
            *role == PublisherUserRole::PartnerCoordinator || self.config.is_override_role(*role)
        });
        if !permitted {
            return Err(StateMachineError::PermissionDenied {
                user_id,
                reason: format!("cannot link studio instance of course run {course_run_id}"),
            }
            .into());
        }

        let updated = run
            .lms_course_id
            .as_deref()
            .is_some_and(|existing| !existing.is_empty());
        run.lms_course_id = Some(lms_course_id.to_string());
        let run = repository.save_course_run(&run, Some(user_id)).await?;

        let pending = self
            .collaborators
            .dispatcher
            .dispatch(NotificationEvent::StudioInstanceCreated {
                course_run_id,
                updated,
            });

        info!(course_run_id, lms_course_id, updated, "🔗 Studio instance linked");
        Ok(ServiceOutcome::new(run, pending))
    }

    pub fn course_state_machine(&self, course_id: i64) -> CourseStateMachine {
        CourseStateMachine::new(course_id, self.collaborators.clone())
    }

    pub fn course_run_state_machine(&self, course_run_id: i64) -> CourseRunStateMachine {
        CourseRunStateMachine::new(course_run_id, self.collaborators.clone())
    }
}
