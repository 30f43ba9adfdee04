use serde::{Deserialize, Serialize};
use std::fmt;

/// An account that can hold publisher roles and receive notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// Superusers hold every object permission.
    pub is_superuser: bool,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            full_name: String::new(),
            is_superuser: false,
        }
    }

    /// Name used in notification bodies: the full name, falling back to the username.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// Per-user publisher preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttribute {
    pub user_id: i64,
    pub enable_email_notification: bool,
}

impl UserAttribute {
    pub fn new(user_id: i64, enable_email_notification: bool) -> Self {
        Self {
            user_id,
            enable_email_notification,
        }
    }
}

impl fmt::Display for UserAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.user_id, self.enable_email_notification)
    }
}
