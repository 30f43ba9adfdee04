use super::context::Actor;
use super::errors::{GuardError, GuardResult};
use super::events::WorkflowEvent;
use crate::constants::{ReviewSides, PUBLISHING_ROLE};
use crate::models::{Course, CourseRun, CourseRunState, CourseState, PublisherUserRole, Seat};
use crate::permissions::{AuthorizationBackend, ResourceRef};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Trait for implementing state transition guards
#[async_trait]
pub trait StateGuard<T: Sync>: Send + Sync {
    /// Check if a transition is allowed
    async fn check(&self, subject: &T, request: &GuardRequest<'_>) -> GuardResult<()>;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Run guards in order, stopping at the first failure
pub(crate) async fn check_guards<T: Sync>(
    guards: &[Box<dyn StateGuard<T>>],
    subject: &T,
    request: &GuardRequest<'_>,
) -> GuardResult<()> {
    for guard in guards {
        if let Err(e) = guard.check(subject, request).await {
            debug!(
                guard = guard.description(),
                event = %request.event,
                user_id = request.actor.id(),
                error = %e,
                "Transition guard refused"
            );
            return Err(e);
        }
    }
    Ok(())
}

/// Who asks for which event
#[derive(Debug, Clone, Copy)]
pub struct GuardRequest<'a> {
    pub actor: &'a Actor,
    pub event: WorkflowEvent,
}

/// A course and its workflow record, loaded for one transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSubject {
    pub course: Course,
    pub state: CourseState,
}

/// A run, its course, its workflow record and its seats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRunSubject {
    pub run: CourseRun,
    pub course: Course,
    pub state: CourseRunState,
    pub seats: Vec<Seat>,
}

/// Records that go through the two-sided review
pub trait ReviewSubject: Sync {
    fn course_id(&self) -> i64;

    fn owner_role(&self) -> PublisherUserRole;
}

impl ReviewSubject for CourseSubject {
    fn course_id(&self) -> i64 {
        self.course.id
    }

    fn owner_role(&self) -> PublisherUserRole {
        self.state.owner_role
    }
}

impl ReviewSubject for CourseRunSubject {
    fn course_id(&self) -> i64 {
        self.course.id
    }

    fn owner_role(&self) -> PublisherUserRole {
        self.state.owner_role
    }
}

/// The role a user acts in when firing `event`, or `None` if no role they hold
/// permits it.
///
/// The current owner is preferred when the user holds several roles.
pub fn acting_role(
    event: WorkflowEvent,
    sides: ReviewSides,
    owner_role: PublisherUserRole,
    override_roles: &[PublisherUserRole],
    held: &[PublisherUserRole],
) -> Option<PublisherUserRole> {
    let holds = |role: &PublisherUserRole| held.contains(role);
    let any_override = || override_roles.iter().copied().find(|r| holds(r));
    let any_side = || [sides.author, sides.reviewer].into_iter().find(|r| holds(r));

    match event {
        WorkflowEvent::SendForReview => {
            if sides.contains(owner_role) && holds(&owner_role) {
                Some(owner_role)
            } else {
                any_side()
            }
        }
        WorkflowEvent::Reject | WorkflowEvent::Approve => {
            if holds(&owner_role) {
                Some(owner_role)
            } else {
                any_override()
            }
        }
        WorkflowEvent::Reopen => any_side().or_else(any_override),
        WorkflowEvent::Publish => holds(&PUBLISHING_ROLE).then_some(PUBLISHING_ROLE),
    }
}

/// Guard requiring the actor to hold a course role permitted for the event
pub struct ReviewRoleGuard {
    sides: ReviewSides,
    override_roles: Vec<PublisherUserRole>,
}

impl ReviewRoleGuard {
    pub fn new(sides: ReviewSides, override_roles: Vec<PublisherUserRole>) -> Self {
        Self {
            sides,
            override_roles,
        }
    }
}

#[async_trait]
impl<T: ReviewSubject> StateGuard<T> for ReviewRoleGuard {
    async fn check(&self, subject: &T, request: &GuardRequest<'_>) -> GuardResult<()> {
        let owner_role = subject.owner_role();
        let role = acting_role(
            request.event,
            self.sides,
            owner_role,
            &self.override_roles,
            &request.actor.roles,
        );

        match role {
            Some(_) => Ok(()),
            None => Err(GuardError::RoleNotPermitted {
                user_id: request.actor.id(),
                reason: format!(
                    "no role on course {} permits {} while {} owns the review",
                    subject.course_id(),
                    request.event,
                    owner_role.display_name()
                ),
            }),
        }
    }

    fn description(&self) -> &'static str {
        "Actor must hold a workflow role permitted for the event"
    }
}

/// Guard delegating to the authorization backend for the course's organizations
pub struct OrganizationPermissionGuard {
    backend: Arc<dyn AuthorizationBackend>,
    permission: &'static str,
}

impl OrganizationPermissionGuard {
    pub fn new(backend: Arc<dyn AuthorizationBackend>, permission: &'static str) -> Self {
        Self {
            backend,
            permission,
        }
    }
}

#[async_trait]
impl<T: ReviewSubject> StateGuard<T> for OrganizationPermissionGuard {
    async fn check(&self, subject: &T, request: &GuardRequest<'_>) -> GuardResult<()> {
        let course_id = subject.course_id();
        let granted = self
            .backend
            .has_permission(
                &request.actor.user,
                ResourceRef::Course(course_id),
                self.permission,
            )
            .await;

        if granted {
            Ok(())
        } else {
            Err(GuardError::MissingPermission {
                user_id: request.actor.id(),
                course_id,
                permission: self.permission.to_string(),
            })
        }
    }

    fn description(&self) -> &'static str {
        "Actor must hold the edit permission on the course organization"
    }
}

/// Fields that keep a course from going to review; empty when it may go.
pub fn course_review_blockers(course: &Course) -> Vec<String> {
    let text_fields = [
        ("title", course.title.as_str()),
        ("number", course.number.as_str()),
        ("short_description", course.short_description.as_str()),
        ("full_description", course.full_description.as_str()),
        ("expected_learnings", course.expected_learnings.as_str()),
        ("prerequisites", course.prerequisites.as_str()),
        ("level_type", course.level_type.as_deref().unwrap_or("")),
    ];

    let mut blockers: Vec<String> = text_fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| (*name).to_string())
        .collect();

    if course.image.as_deref().map_or(true, |i| i.trim().is_empty()) {
        blockers.push("image".to_string());
    }
    if course.organization_ids.is_empty() {
        blockers.push("organizations".to_string());
    }
    blockers
}

/// Fields and rules that keep a run from going to review.
pub fn course_run_review_blockers(run: &CourseRun, seats: &[Seat]) -> Vec<String> {
    let mut blockers = Vec::new();
    let mut require = |present: bool, name: &str| {
        if !present {
            blockers.push(name.to_string());
        }
    };

    require(run.start.is_some(), "start");
    require(run.end.is_some(), "end");
    require(run.pacing_type.is_some(), "pacing_type");
    require(run.min_effort.is_some(), "min_effort");
    require(run.max_effort.is_some(), "max_effort");
    require(
        run.language.as_deref().is_some_and(|l| !l.trim().is_empty()),
        "language",
    );
    require(!run.transcript_languages.is_empty(), "transcript_languages");
    require(!run.staff_ids.is_empty(), "staff");
    require(!seats.is_empty(), "seats");

    if let (Some(start), Some(end)) = (run.start, run.end) {
        if end <= start {
            blockers.push("end must be after start".to_string());
        }
    }
    if let (Some(min), Some(max)) = (run.min_effort, run.max_effort) {
        if min > max {
            blockers.push("min_effort must not exceed max_effort".to_string());
        }
    }
    blockers
}

/// Guard enforcing the course checklist before review
pub struct CourseReadyForReviewGuard;

#[async_trait]
impl StateGuard<CourseSubject> for CourseReadyForReviewGuard {
    async fn check(&self, subject: &CourseSubject, _request: &GuardRequest<'_>) -> GuardResult<()> {
        let failed = course_review_blockers(&subject.course);
        if failed.is_empty() {
            Ok(())
        } else {
            Err(GuardError::PreconditionsFailed { failed })
        }
    }

    fn description(&self) -> &'static str {
        "Course metadata must be complete before review"
    }
}

/// Guard enforcing the run checklist before review
pub struct CourseRunReadyForReviewGuard;

#[async_trait]
impl StateGuard<CourseRunSubject> for CourseRunReadyForReviewGuard {
    async fn check(
        &self,
        subject: &CourseRunSubject,
        _request: &GuardRequest<'_>,
    ) -> GuardResult<()> {
        let failed = course_run_review_blockers(&subject.run, &subject.seats);
        if failed.is_empty() {
            Ok(())
        } else {
            Err(GuardError::PreconditionsFailed { failed })
        }
    }

    fn description(&self) -> &'static str {
        "Course run metadata must be complete before review"
    }
}

/// Guard requiring the studio identifier before publishing
pub struct PublishMetadataGuard;

#[async_trait]
impl StateGuard<CourseRunSubject> for PublishMetadataGuard {
    async fn check(
        &self,
        subject: &CourseRunSubject,
        _request: &GuardRequest<'_>,
    ) -> GuardResult<()> {
        let has_lms_id = subject
            .run
            .lms_course_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());

        if has_lms_id {
            Ok(())
        } else {
            Err(GuardError::PreconditionsFailed {
                failed: vec!["lms_course_id".to_string()],
            })
        }
    }

    fn description(&self) -> &'static str {
        "Course run must have a studio identifier before publishing"
    }
}
