//! In-process [`WorkflowRepository`].
//!
//! All tables sit behind a single `RwLock`, so uniqueness checks and the
//! writes they guard happen under one write lock and a save either fully
//! applies (record plus history row) or not at all.

use super::history::{ChangeType, EntityRef, HistoryRecord};
use super::repository::WorkflowRepository;
use crate::models::{
    Course, CourseRun, CourseRunState, CourseState, CourseUserRole, Group, NewCourse,
    NewCourseRun, Organization, OrganizationExtension, OrganizationUserRole, Partner,
    PublisherUserRole, Seat, User, UserAttribute,
};
use crate::state_machine::errors::{not_found, PersistenceError, PersistenceResult};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    user_attributes: HashMap<i64, UserAttribute>,
    partners: BTreeMap<i64, Partner>,
    organizations: BTreeMap<i64, Organization>,
    groups: BTreeMap<i64, Group>,
    organization_extensions: BTreeMap<i64, OrganizationExtension>,
    courses: BTreeMap<i64, Course>,
    course_runs: BTreeMap<i64, CourseRun>,
    seats: BTreeMap<i64, Seat>,
    /// Keyed by course id
    course_states: HashMap<i64, CourseState>,
    /// Keyed by course run id
    course_run_states: HashMap<i64, CourseRunState>,
    course_user_roles: BTreeMap<i64, CourseUserRole>,
    organization_user_roles: BTreeMap<i64, OrganizationUserRole>,
    history: Vec<HistoryRecord>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn record_history<T: Serialize>(
        &mut self,
        entity: EntityRef,
        change_type: ChangeType,
        actor: Option<i64>,
        record: &T,
        metadata: Option<Value>,
    ) -> PersistenceResult<()> {
        let record = serde_json::to_value(record).map_err(|e| PersistenceError::SaveFailed {
            reason: format!("Failed to snapshot {entity}: {e}"),
        })?;
        let snapshot = match metadata {
            Some(metadata) => json!({ "record": record, "metadata": metadata }),
            None => json!({ "record": record }),
        };
        self.history
            .push(HistoryRecord::new(entity, change_type, actor, snapshot));
        Ok(())
    }

    fn require_user(&self, user_id: i64) -> PersistenceResult<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(not_found("user", user_id))
        }
    }

    fn require_course(&self, course_id: i64) -> PersistenceResult<()> {
        if self.courses.contains_key(&course_id) {
            Ok(())
        } else {
            Err(not_found("course", course_id))
        }
    }

    fn require_organizations(&self, organization_ids: &[i64]) -> PersistenceResult<()> {
        match organization_ids
            .iter()
            .find(|id| !self.organizations.contains_key(id))
        {
            Some(missing) => Err(not_found("organization", *missing)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_user(&self, username: &str, email: &str) -> User {
        let mut tables = self.tables.write();
        let user = User::new(tables.next_id(), username, email);
        tables.users.insert(user.id, user.clone());
        user
    }

    pub fn update_user(&self, user: User) -> PersistenceResult<User> {
        let mut tables = self.tables.write();
        tables.require_user(user.id)?;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn set_user_attribute(&self, attribute: UserAttribute) -> PersistenceResult<()> {
        let mut tables = self.tables.write();
        tables.require_user(attribute.user_id)?;
        tables.user_attributes.insert(attribute.user_id, attribute);
        Ok(())
    }

    pub fn create_partner(&self, name: &str, short_code: &str, studio_url: Option<&str>) -> Partner {
        let mut tables = self.tables.write();
        let partner = Partner {
            id: tables.next_id(),
            name: name.to_string(),
            short_code: short_code.to_string(),
            studio_url: studio_url.map(str::to_string),
        };
        tables.partners.insert(partner.id, partner.clone());
        partner
    }

    pub fn create_organization(
        &self,
        key: &str,
        name: &str,
        partner_id: i64,
    ) -> PersistenceResult<Organization> {
        let mut tables = self.tables.write();
        if !tables.partners.contains_key(&partner_id) {
            return Err(not_found("partner", partner_id));
        }
        let organization = Organization {
            id: tables.next_id(),
            key: key.to_string(),
            name: name.to_string(),
            partner_id,
            certificate_name: None,
        };
        tables
            .organizations
            .insert(organization.id, organization.clone());
        Ok(organization)
    }

    pub fn update_organization(&self, organization: Organization) -> PersistenceResult<()> {
        let mut tables = self.tables.write();
        tables.require_organizations(&[organization.id])?;
        tables.organizations.insert(organization.id, organization);
        Ok(())
    }

    pub fn create_group(&self, name: &str) -> Group {
        let mut tables = self.tables.write();
        let group = Group {
            id: tables.next_id(),
            name: name.to_string(),
        };
        tables.groups.insert(group.id, group.clone());
        group
    }

    /// Link an organization to its permission group. Both sides are one-to-one.
    pub fn create_organization_extension(
        &self,
        organization_id: i64,
        group_id: i64,
    ) -> PersistenceResult<OrganizationExtension> {
        let mut tables = self.tables.write();
        tables.require_organizations(&[organization_id])?;
        if !tables.groups.contains_key(&group_id) {
            return Err(not_found("group", group_id));
        }
        let duplicate = tables
            .organization_extensions
            .values()
            .any(|ext| ext.organization_id == organization_id || ext.group_id == group_id);
        if duplicate {
            return Err(PersistenceError::ConstraintViolation {
                constraint: "organization_extension one-to-one (organization, group)".to_string(),
            });
        }
        let extension = OrganizationExtension {
            id: tables.next_id(),
            organization_id,
            group_id,
        };
        tables
            .organization_extensions
            .insert(extension.id, extension.clone());
        Ok(extension)
    }

    /// Number of history rows across all entities.
    pub fn history_len(&self) -> usize {
        self.tables.read().history.len()
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryRepository {
    async fn user(&self, user_id: i64) -> PersistenceResult<User> {
        self.tables
            .read()
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| not_found("user", user_id))
    }

    async fn user_attribute(&self, user_id: i64) -> PersistenceResult<Option<UserAttribute>> {
        Ok(self.tables.read().user_attributes.get(&user_id).cloned())
    }

    async fn organization(&self, organization_id: i64) -> PersistenceResult<Organization> {
        self.tables
            .read()
            .organizations
            .get(&organization_id)
            .cloned()
            .ok_or_else(|| not_found("organization", organization_id))
    }

    async fn partner(&self, partner_id: i64) -> PersistenceResult<Partner> {
        self.tables
            .read()
            .partners
            .get(&partner_id)
            .cloned()
            .ok_or_else(|| not_found("partner", partner_id))
    }

    async fn organization_extension(
        &self,
        organization_id: i64,
    ) -> PersistenceResult<Option<OrganizationExtension>> {
        Ok(self
            .tables
            .read()
            .organization_extensions
            .values()
            .find(|ext| ext.organization_id == organization_id)
            .cloned())
    }

    async fn create_course(
        &self,
        new_course: NewCourse,
        owner_role: PublisherUserRole,
        actor: Option<i64>,
    ) -> PersistenceResult<Course> {
        let mut tables = self.tables.write();
        tables.require_organizations(&new_course.organization_ids)?;

        let course = new_course.into_course(tables.next_id(), Utc::now());
        let state = CourseState::new(course.id, owner_role);

        tables.record_history(
            EntityRef::Course(course.id),
            ChangeType::Created,
            actor,
            &course,
            None,
        )?;
        tables.record_history(
            EntityRef::CourseState(course.id),
            ChangeType::Created,
            actor,
            &state,
            None,
        )?;
        tables.courses.insert(course.id, course.clone());
        tables.course_states.insert(course.id, state);

        debug!(course_id = course.id, "Created course with draft state");
        Ok(course)
    }

    async fn course(&self, course_id: i64) -> PersistenceResult<Course> {
        self.tables
            .read()
            .courses
            .get(&course_id)
            .cloned()
            .ok_or_else(|| not_found("course", course_id))
    }

    async fn save_course(&self, course: &Course, actor: Option<i64>) -> PersistenceResult<Course> {
        let mut tables = self.tables.write();
        tables.require_course(course.id)?;
        tables.require_organizations(&course.organization_ids)?;

        let mut saved = course.clone();
        saved.modified = Utc::now();
        tables.record_history(
            EntityRef::Course(saved.id),
            ChangeType::Changed,
            actor,
            &saved,
            None,
        )?;
        tables.courses.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn create_course_run(
        &self,
        new_run: NewCourseRun,
        owner_role: PublisherUserRole,
        actor: Option<i64>,
    ) -> PersistenceResult<CourseRun> {
        let mut tables = self.tables.write();
        tables.require_course(new_run.course_id)?;

        let run = new_run.into_course_run(tables.next_id(), Utc::now());
        let state = CourseRunState::new(run.id, owner_role);

        tables.record_history(
            EntityRef::CourseRun(run.id),
            ChangeType::Created,
            actor,
            &run,
            None,
        )?;
        tables.record_history(
            EntityRef::CourseRunState(run.id),
            ChangeType::Created,
            actor,
            &state,
            None,
        )?;
        tables.course_runs.insert(run.id, run.clone());
        tables.course_run_states.insert(run.id, state);

        debug!(course_run_id = run.id, course_id = run.course_id, "Created course run with draft state");
        Ok(run)
    }

    async fn course_run(&self, course_run_id: i64) -> PersistenceResult<CourseRun> {
        self.tables
            .read()
            .course_runs
            .get(&course_run_id)
            .cloned()
            .ok_or_else(|| not_found("course_run", course_run_id))
    }

    async fn course_runs(&self, course_id: i64) -> PersistenceResult<Vec<CourseRun>> {
        let tables = self.tables.read();
        tables.require_course(course_id)?;
        Ok(tables
            .course_runs
            .values()
            .filter(|run| run.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn save_course_run(
        &self,
        course_run: &CourseRun,
        actor: Option<i64>,
    ) -> PersistenceResult<CourseRun> {
        let mut tables = self.tables.write();
        if !tables.course_runs.contains_key(&course_run.id) {
            return Err(not_found("course_run", course_run.id));
        }

        let mut saved = course_run.clone();
        saved.modified = Utc::now();
        tables.record_history(
            EntityRef::CourseRun(saved.id),
            ChangeType::Changed,
            actor,
            &saved,
            None,
        )?;
        tables.course_runs.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn add_seat(&self, seat: Seat, actor: Option<i64>) -> PersistenceResult<Seat> {
        let mut tables = self.tables.write();
        if !tables.course_runs.contains_key(&seat.course_run_id) {
            return Err(not_found("course_run", seat.course_run_id));
        }

        let mut seat = seat;
        seat.id = tables.next_id();
        tables.record_history(
            EntityRef::Seat(seat.id),
            ChangeType::Created,
            actor,
            &seat,
            None,
        )?;
        tables.seats.insert(seat.id, seat.clone());
        Ok(seat)
    }

    async fn seats(&self, course_run_id: i64) -> PersistenceResult<Vec<Seat>> {
        Ok(self
            .tables
            .read()
            .seats
            .values()
            .filter(|seat| seat.course_run_id == course_run_id)
            .cloned()
            .collect())
    }

    async fn course_state(&self, course_id: i64) -> PersistenceResult<CourseState> {
        self.tables
            .read()
            .course_states
            .get(&course_id)
            .cloned()
            .ok_or_else(|| not_found("course_state", course_id))
    }

    async fn save_course_state(
        &self,
        state: &CourseState,
        actor: Option<i64>,
        metadata: Option<Value>,
    ) -> PersistenceResult<CourseState> {
        let mut tables = self.tables.write();
        let stored_version = tables
            .course_states
            .get(&state.course_id)
            .map(|s| s.version)
            .ok_or_else(|| not_found("course_state", state.course_id))?;

        if stored_version != state.version {
            return Err(PersistenceError::ConcurrentModification {
                entity: "course_state",
                id: state.course_id,
            });
        }

        let mut saved = state.clone();
        saved.version += 1;
        saved.modified = Utc::now();
        tables.record_history(
            EntityRef::CourseState(saved.course_id),
            ChangeType::Changed,
            actor,
            &saved,
            metadata,
        )?;
        tables.course_states.insert(saved.course_id, saved.clone());
        Ok(saved)
    }

    async fn course_run_state(&self, course_run_id: i64) -> PersistenceResult<CourseRunState> {
        self.tables
            .read()
            .course_run_states
            .get(&course_run_id)
            .cloned()
            .ok_or_else(|| not_found("course_run_state", course_run_id))
    }

    async fn save_course_run_state(
        &self,
        state: &CourseRunState,
        actor: Option<i64>,
        metadata: Option<Value>,
    ) -> PersistenceResult<CourseRunState> {
        let mut tables = self.tables.write();
        let stored_version = tables
            .course_run_states
            .get(&state.course_run_id)
            .map(|s| s.version)
            .ok_or_else(|| not_found("course_run_state", state.course_run_id))?;

        if stored_version != state.version {
            return Err(PersistenceError::ConcurrentModification {
                entity: "course_run_state",
                id: state.course_run_id,
            });
        }

        let mut saved = state.clone();
        saved.version += 1;
        saved.modified = Utc::now();
        tables.record_history(
            EntityRef::CourseRunState(saved.course_run_id),
            ChangeType::Changed,
            actor,
            &saved,
            metadata,
        )?;
        tables
            .course_run_states
            .insert(saved.course_run_id, saved.clone());
        Ok(saved)
    }

    async fn add_course_role(
        &self,
        course_id: i64,
        role: PublisherUserRole,
        user_id: i64,
    ) -> PersistenceResult<(CourseUserRole, bool)> {
        let mut tables = self.tables.write();
        tables.require_course(course_id)?;
        tables.require_user(user_id)?;

        let existing = tables
            .course_user_roles
            .values()
            .find(|r| r.course_id == course_id && r.role == role)
            .cloned();

        match existing {
            Some(existing) if existing.user_id == user_id => Ok((existing, false)),
            Some(_) => Err(PersistenceError::ConstraintViolation {
                constraint: format!("course_user_role unique (course {course_id}, role {role})"),
            }),
            None => {
                let course_role = CourseUserRole {
                    id: tables.next_id(),
                    course_id,
                    user_id,
                    role,
                    created: Utc::now(),
                };
                tables.record_history(
                    EntityRef::CourseUserRole(course_role.id),
                    ChangeType::Created,
                    None,
                    &course_role,
                    None,
                )?;
                tables
                    .course_user_roles
                    .insert(course_role.id, course_role.clone());
                Ok((course_role, true))
            }
        }
    }

    async fn course_user_roles(&self, course_id: i64) -> PersistenceResult<Vec<CourseUserRole>> {
        Ok(self
            .tables
            .read()
            .course_user_roles
            .values()
            .filter(|r| r.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn add_organization_role(
        &self,
        organization_id: i64,
        role: PublisherUserRole,
        user_id: i64,
    ) -> PersistenceResult<OrganizationUserRole> {
        let mut tables = self.tables.write();
        tables.require_organizations(&[organization_id])?;
        tables.require_user(user_id)?;

        let duplicate = tables
            .organization_user_roles
            .values()
            .any(|r| r.organization_id == organization_id && r.role == role);
        if duplicate {
            return Err(PersistenceError::ConstraintViolation {
                constraint: format!(
                    "organization_user_role unique (organization {organization_id}, role {role})"
                ),
            });
        }

        let organization_role = OrganizationUserRole {
            id: tables.next_id(),
            organization_id,
            user_id,
            role,
        };
        tables.record_history(
            EntityRef::OrganizationUserRole(organization_role.id),
            ChangeType::Created,
            None,
            &organization_role,
            None,
        )?;
        tables
            .organization_user_roles
            .insert(organization_role.id, organization_role.clone());
        Ok(organization_role)
    }

    async fn organization_user_roles(
        &self,
        organization_id: i64,
    ) -> PersistenceResult<Vec<OrganizationUserRole>> {
        Ok(self
            .tables
            .read()
            .organization_user_roles
            .values()
            .filter(|r| r.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn history(&self, entity: EntityRef) -> PersistenceResult<Vec<HistoryRecord>> {
        Ok(self
            .tables
            .read()
            .history
            .iter()
            .filter(|h| h.entity == entity)
            .cloned()
            .collect())
    }
}
