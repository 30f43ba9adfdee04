//! Group-based object permissions.
//!
//! Users join groups; groups are granted named permissions on an
//! [`OrganizationExtension`]. A user holds a permission on a course when any of
//! the course's organizations grants it to one of the user's groups.

use super::backend::{AuthorizationBackend, ResourceRef};
use crate::models::{OrganizationExtension, User};
use crate::state_machine::errors::PersistenceResult;
use crate::store::WorkflowRepository;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct GroupPermissionBackend {
    repository: Arc<dyn WorkflowRepository>,
    /// user id -> group ids
    memberships: DashMap<i64, HashSet<i64>>,
    /// (group id, organization extension id) -> permission names
    grants: DashMap<(i64, i64), HashSet<String>>,
}

impl std::fmt::Debug for GroupPermissionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupPermissionBackend")
            .field("memberships", &self.memberships.len())
            .field("grants", &self.grants.len())
            .finish()
    }
}

impl GroupPermissionBackend {
    pub fn new(repository: Arc<dyn WorkflowRepository>) -> Self {
        Self {
            repository,
            memberships: DashMap::new(),
            grants: DashMap::new(),
        }
    }

    pub fn add_user_to_group(&self, user_id: i64, group_id: i64) {
        self.memberships.entry(user_id).or_default().insert(group_id);
    }

    pub fn remove_user_from_group(&self, user_id: i64, group_id: i64) {
        if let Some(mut groups) = self.memberships.get_mut(&user_id) {
            groups.remove(&group_id);
        }
    }

    pub fn groups_for_user(&self, user_id: i64) -> HashSet<i64> {
        self.memberships
            .get(&user_id)
            .map(|groups| groups.clone())
            .unwrap_or_default()
    }

    /// Grant `permission` to `group_id` on the organization extension.
    pub fn assign_perm(&self, permission: &str, group_id: i64, extension: &OrganizationExtension) {
        debug!(
            permission,
            group_id,
            organization_id = extension.organization_id,
            "Assigning object permission"
        );
        self.grants
            .entry((group_id, extension.id))
            .or_default()
            .insert(permission.to_string());
    }

    pub fn remove_perm(&self, permission: &str, group_id: i64, extension: &OrganizationExtension) {
        if let Some(mut permissions) = self.grants.get_mut(&(group_id, extension.id)) {
            permissions.remove(permission);
        }
    }

    /// Whether `user` holds `permission` on one organization extension.
    pub fn user_has_perm(
        &self,
        user: &User,
        permission: &str,
        extension: &OrganizationExtension,
    ) -> bool {
        if user.is_superuser {
            return true;
        }

        self.groups_for_user(user.id).into_iter().any(|group_id| {
            self.grants
                .get(&(group_id, extension.id))
                .is_some_and(|permissions| permissions.contains(permission))
        })
    }

    /// Whether `user` holds `permission` through any organization of the course.
    pub async fn check_course_organization_permission(
        &self,
        user: &User,
        course_id: i64,
        permission: &str,
    ) -> PersistenceResult<bool> {
        if user.is_superuser {
            return Ok(true);
        }

        let course = self.repository.course(course_id).await?;
        for organization_id in &course.organization_ids {
            if self
                .check_organization_permission(user, *organization_id, permission)
                .await?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn check_organization_permission(
        &self,
        user: &User,
        organization_id: i64,
        permission: &str,
    ) -> PersistenceResult<bool> {
        let extension = self
            .repository
            .organization_extension(organization_id)
            .await?;
        Ok(extension.is_some_and(|ext| self.user_has_perm(user, permission, &ext)))
    }
}

#[async_trait]
impl AuthorizationBackend for GroupPermissionBackend {
    async fn has_permission(&self, user: &User, resource: ResourceRef, permission: &str) -> bool {
        let result = match resource {
            ResourceRef::Course(course_id) => {
                self.check_course_organization_permission(user, course_id, permission)
                    .await
            }
            ResourceRef::Organization(organization_id) => {
                if user.is_superuser {
                    Ok(true)
                } else {
                    self.check_organization_permission(user, organization_id, permission)
                        .await
                }
            }
        };

        result.unwrap_or_else(|error| {
            warn!(
                user_id = user.id,
                %resource,
                permission,
                %error,
                "Permission lookup failed, denying"
            );
            false
        })
    }

    fn description(&self) -> &'static str {
        "Organization group object permissions"
    }
}
