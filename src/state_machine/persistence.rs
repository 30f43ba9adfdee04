use super::errors::PersistenceResult;
use crate::models::{CourseRunState, CourseState};
use crate::store::WorkflowRepository;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Trait for loading and committing workflow state records
#[async_trait]
pub trait TransitionPersistence<S>: Send + Sync {
    /// Load the current state record of the owner
    async fn resolve_current_state(&self, owner_id: i64) -> PersistenceResult<S>;

    /// Commit the updated record in one versioned save and return it
    async fn persist_transition(
        &self,
        state: &S,
        user_id: i64,
        metadata: Value,
    ) -> PersistenceResult<S>;
}

/// State persistence backed by the workflow repository
#[derive(Clone)]
pub struct RepositoryPersistence {
    repository: Arc<dyn WorkflowRepository>,
}

impl RepositoryPersistence {
    pub fn new(repository: Arc<dyn WorkflowRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl TransitionPersistence<CourseState> for RepositoryPersistence {
    async fn resolve_current_state(&self, course_id: i64) -> PersistenceResult<CourseState> {
        self.repository.course_state(course_id).await
    }

    async fn persist_transition(
        &self,
        state: &CourseState,
        user_id: i64,
        metadata: Value,
    ) -> PersistenceResult<CourseState> {
        self.repository
            .save_course_state(state, Some(user_id), Some(metadata))
            .await
    }
}

#[async_trait]
impl TransitionPersistence<CourseRunState> for RepositoryPersistence {
    async fn resolve_current_state(&self, course_run_id: i64) -> PersistenceResult<CourseRunState> {
        self.repository.course_run_state(course_run_id).await
    }

    async fn persist_transition(
        &self,
        state: &CourseRunState,
        user_id: i64,
        metadata: Value,
    ) -> PersistenceResult<CourseRunState> {
        self.repository
            .save_course_run_state(state, Some(user_id), Some(metadata))
            .await
    }
}
