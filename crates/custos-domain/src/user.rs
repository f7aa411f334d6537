// user.rs — Roles and users.
//
// Roles are a closed enum rather than scattered boolean flags: adding a role
// means the compiler points at every capability predicate that must decide
// about it, instead of leaving stale `is_admin`-style checks behind.

use serde::{Deserialize, Serialize};

/// The closed set of roles known to the system.
///
/// Role assignment is owned by the external user directory; this crate only
/// interprets roles through the capability predicates on [`User`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access: custody actions plus export visibility.
    Admin,
    /// May check out and return tools.
    Technician,
    /// Read-only inventory access; no custody actions.
    Viewer,
    /// May view audit exports but performs no custody actions.
    Auditor,
}

/// A user as seen by the custody core: an identifier and a role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Opaque identifier, assigned by the external user directory.
    pub user_id: String,
    /// The user's role.
    pub role: Role,
}

impl User {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Whether this user may check tools out of inventory.
    pub fn can_checkout(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Technician)
    }

    /// Whether this user may view audit exports.
    pub fn can_view_exports(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Auditor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_and_technician_can_checkout() {
        assert!(User::new("u1", Role::Admin).can_checkout());
        assert!(User::new("u2", Role::Technician).can_checkout());
    }

    #[test]
    fn viewer_and_auditor_cannot_checkout() {
        assert!(!User::new("u3", Role::Viewer).can_checkout());
        assert!(!User::new("u4", Role::Auditor).can_checkout());
    }

    #[test]
    fn export_visibility_is_admin_or_auditor() {
        assert!(User::new("u1", Role::Admin).can_view_exports());
        assert!(User::new("u4", Role::Auditor).can_view_exports());
        assert!(!User::new("u2", Role::Technician).can_view_exports());
        assert!(!User::new("u3", Role::Viewer).can_view_exports());
    }

    #[test]
    fn role_serializes_as_snake_case() {
        let json = serde_json::to_string(&Role::Technician).unwrap();
        assert_eq!(json, "\"technician\"");
    }
}
