//! Email rendering for workflow notifications.
//!
//! Each [`NotificationEvent`] becomes one plain-text [`EmailMessage`]. Record
//! lookups happen at send time, so the message reflects the committed state.

use super::dispatcher::Notifier;
use super::events::{NotificationError, NotificationEvent, NotificationKind};
use super::mailer::Mailer;
use crate::config::NotificationsConfig;
use crate::constants::ReviewSides;
use crate::models::PublisherUserRole;
use crate::state_machine::states::CourseRunWorkflowState;
use crate::store::WorkflowRepository;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub to: Vec<String>,
    pub bcc: Vec<String>,
}

/// [`Notifier`] that renders email and hands it to a [`Mailer`].
pub struct EmailNotifier {
    repository: Arc<dyn WorkflowRepository>,
    mailer: Arc<dyn Mailer>,
    from_email: String,
    site_domain: String,
}

impl EmailNotifier {
    pub fn new(
        repository: Arc<dyn WorkflowRepository>,
        mailer: Arc<dyn Mailer>,
        config: &NotificationsConfig,
    ) -> Self {
        Self {
            repository,
            mailer,
            from_email: config.from_email.clone(),
            site_domain: config.site_domain.trim_matches('/').to_string(),
        }
    }

    fn page_url(&self, path: &str) -> String {
        format!("https://{}{}", self.site_domain, path)
    }

    /// Render the message for `event`; `None` when nobody should receive it.
    pub async fn render(
        &self,
        event: &NotificationEvent,
    ) -> Result<Option<EmailMessage>, NotificationError> {
        match event {
            NotificationEvent::StateChanged {
                course_run_id,
                state,
            } => self.render_state_changed(*course_run_id, *state).await,
            NotificationEvent::StudioInstanceCreated {
                course_run_id,
                updated,
            } => self
                .render_studio_instance_created(*course_run_id, *updated)
                .await
                .map(Some),
            NotificationEvent::CourseCreated {
                course_id,
                course_run_id,
            } => self
                .render_course_created(*course_id, *course_run_id)
                .await
                .map(Some),
            NotificationEvent::SentForReview {
                course_id,
                sender_id,
                sender_role,
            } => self
                .render_sent_for_review(*course_id, *sender_id, *sender_role)
                .await
                .map(Some),
        }
    }

    async fn render_state_changed(
        &self,
        course_run_id: i64,
        state: CourseRunWorkflowState,
    ) -> Result<Option<EmailMessage>, NotificationError> {
        let kind = NotificationKind::StateChanged;
        let run = self
            .repository
            .course_run(course_run_id)
            .await
            .map_err(NotificationError::lookup(kind))?;
        let course = self
            .repository
            .course(run.course_id)
            .await
            .map_err(NotificationError::lookup(kind))?;
        let to = self
            .repository
            .course_users_emails(course.id)
            .await
            .map_err(NotificationError::lookup(kind))?;

        if to.is_empty() {
            debug!(course_run_id, "No subscribed course users, skipping state change email");
            return Ok(None);
        }

        let start = run
            .start
            .map(|start| start.format("%B %d, %Y").to_string())
            .unwrap_or_default();
        let subject = format!(
            "Course Run {}-{}-{} state has been changed.",
            course.title,
            run.pacing_display(),
            start
        );
        let page_url = self.page_url(&format!("/publisher/course_runs/{course_run_id}/"));
        let body = format!(
            "Dear all,\n\n\
             The state of course run {} has been changed to {}.\n\n\
             View the course run: {}\n\n\
             Thanks,\nThe Publisher team\n",
            run.display_with(&course),
            state.display_name(),
            page_url
        );

        Ok(Some(EmailMessage {
            subject,
            body,
            from: self.from_email.clone(),
            to,
            bcc: Vec::new(),
        }))
    }

    async fn render_studio_instance_created(
        &self,
        course_run_id: i64,
        updated: bool,
    ) -> Result<EmailMessage, NotificationError> {
        let kind = NotificationKind::StudioInstanceCreated;
        let run = self
            .repository
            .course_run(course_run_id)
            .await
            .map_err(NotificationError::lookup(kind))?;
        let course = self
            .repository
            .course(run.course_id)
            .await
            .map_err(NotificationError::lookup(kind))?;
        let bcc = self
            .repository
            .course_users_emails(course.id)
            .await
            .map_err(NotificationError::lookup(kind))?;
        let course_team = self
            .repository
            .user_for_role(course.id, PublisherUserRole::CourseTeam)
            .await
            .map_err(NotificationError::lookup(kind))?;
        let coordinator = self
            .repository
            .user_for_role(course.id, PublisherUserRole::PartnerCoordinator)
            .await
            .map_err(NotificationError::lookup(kind))?;

        let updated_text = if updated { "updated" } else { "created" };
        let page_url = self.page_url(&format!("/publisher/course_runs/{course_run_id}/"));
        let body = format!(
            "Dear {},\n\n\
             The Studio instance for {} ({}) has been {}.\n\n\
             View the course run: {}\n\n\
             Questions? Contact {} at {}.\n\n\
             Thanks,\nThe Publisher team\n",
            course_team.as_ref().map(|u| u.display_name()).unwrap_or(""),
            course.title,
            run.lms_course_id.as_deref().unwrap_or(""),
            updated_text,
            page_url,
            coordinator.as_ref().map(|u| u.display_name()).unwrap_or(""),
            coordinator.as_ref().map(|u| u.email.as_str()).unwrap_or(""),
        );

        Ok(EmailMessage {
            subject: format!("Studio instance {updated_text}"),
            body,
            from: self.from_email.clone(),
            to: vec![self.from_email.clone()],
            bcc,
        })
    }

    async fn render_course_created(
        &self,
        course_id: i64,
        course_run_id: i64,
    ) -> Result<EmailMessage, NotificationError> {
        let kind = NotificationKind::CourseCreated;
        let course = self
            .repository
            .course(course_id)
            .await
            .map_err(NotificationError::lookup(kind))?;
        let run = self
            .repository
            .course_run(course_run_id)
            .await
            .map_err(NotificationError::lookup(kind))?;
        let bcc = self
            .repository
            .course_users_emails(course_id)
            .await
            .map_err(NotificationError::lookup(kind))?;
        let course_team = self
            .repository
            .user_for_role(course_id, PublisherUserRole::CourseTeam)
            .await
            .map_err(NotificationError::lookup(kind))?;
        let coordinator = self
            .repository
            .user_for_role(course_id, PublisherUserRole::PartnerCoordinator)
            .await
            .map_err(NotificationError::lookup(kind))?;

        let body = format!(
            "Dear {},\n\n\
             {} requested a Studio instance for {} on {} at {}.\n\n\
             Dashboard: {}\n\n\
             Questions? Contact {}.\n\n\
             Thanks,\nThe Publisher team\n",
            coordinator.as_ref().map(|u| u.display_name()).unwrap_or(""),
            course_team.as_ref().map(|u| u.display_name()).unwrap_or(""),
            course.title,
            run.created.format("%B %d, %Y"),
            run.created.format("%H:%M:%S"),
            self.page_url("/publisher/"),
            coordinator.as_ref().map(|u| u.email.as_str()).unwrap_or(""),
        );

        Ok(EmailMessage {
            subject: format!("New Studio instance request for {}", course.title),
            body,
            from: self.from_email.clone(),
            to: vec![self.from_email.clone()],
            bcc,
        })
    }

    async fn render_sent_for_review(
        &self,
        course_id: i64,
        sender_id: i64,
        sender_role: PublisherUserRole,
    ) -> Result<EmailMessage, NotificationError> {
        let kind = NotificationKind::SentForReview;
        let course = self
            .repository
            .course(course_id)
            .await
            .map_err(NotificationError::lookup(kind))?;
        let sender = self
            .repository
            .user(sender_id)
            .await
            .map_err(NotificationError::lookup(kind))?;

        let sides = ReviewSides::COURSE;
        let recipient_role = sides.counterpart(sender_role).unwrap_or(sides.reviewer);
        let recipient = self
            .repository
            .user_for_role(course_id, recipient_role)
            .await
            .map_err(NotificationError::lookup(kind))?
            .ok_or_else(|| NotificationError::MissingRecipient {
                kind,
                reason: format!("course {course_id} has no {}", recipient_role.display_name()),
            })?;

        let page_url = self.page_url(&format!("/publisher/courses/{course_id}/"));
        let body = format!(
            "Dear {},\n\n\
             {} has sent {} for your review.\n\n\
             View the course: {}\n\n\
             Thanks,\nThe Publisher team\n",
            recipient.display_name(),
            sender.display_name(),
            course.title,
            page_url
        );

        Ok(EmailMessage {
            subject: format!("Changes to {} are ready for review", course.title),
            body,
            from: self.from_email.clone(),
            to: vec![recipient.email],
            bcc: Vec::new(),
        })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        match self.render(event).await? {
            Some(message) => self.mailer.send(message).await,
            None => Ok(()),
        }
    }

    fn description(&self) -> &'static str {
        "Email notifications"
    }
}
