//! Organizations, the partners that own them, and the permission-group
//! extension that ties an organization to object permissions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalog partner; owns organizations and hosts the authoring studio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    pub id: i64,
    pub name: String,
    pub short_code: String,
    pub studio_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub partner_id: i64,
    /// Overrides `name` on issued certificates when populated.
    pub certificate_name: Option<String>,
}

impl Organization {
    /// Name printed on certificates.
    pub fn display_certificate_name(&self) -> &str {
        match self.certificate_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.name,
        }
    }
}

impl fmt::Display for Organization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.name)
    }
}

/// A permission group. Membership lives in the authorization backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

/// One-to-one extension of an [`Organization`] with its permission [`Group`].
///
/// Each organization has at most one extension and each group backs at most
/// one organization. Object permissions (see [`crate::constants::permissions`])
/// are granted to the group on this extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationExtension {
    pub id: i64,
    pub organization_id: i64,
    pub group_id: i64,
}

impl fmt::Display for OrganizationExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.organization_id, self.group_id)
    }
}
