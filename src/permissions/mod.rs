//! # Permissions
//!
//! The authorization collaborator. The state machines only ever ask a yes/no
//! question through [`AuthorizationBackend`]; how memberships and grants are
//! stored is up to the implementation.

pub mod backend;
pub mod groups;

pub use backend::{AllowAll, AuthorizationBackend, ResourceRef};
pub use groups::GroupPermissionBackend;
