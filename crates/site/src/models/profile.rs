//! Profile rows used for admin authorization.
//!
//! Profiles are owned by the hosted identity/database service. This codebase
//! only reads them.

use uuid::Uuid;

/// The only role value that grants access to the admin console.
pub const ADMIN_ROLE: &str = "admin";

/// A profile row keyed by the identity-service user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Same value as the identity-service user id.
    pub id: Uuid,
    /// Contact email recorded on the profile, if any.
    pub email: Option<String>,
    /// Free-form role column; `None` when the column is null.
    pub role: Option<String>,
}

impl Profile {
    /// Whether the role is exactly `admin`.
    ///
    /// Comparison is case-sensitive and does not trim; `"Admin"`, `" admin"`,
    /// and a null role all fail.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: Option<&str>) -> Profile {
        Profile {
            id: Uuid::nil(),
            email: None,
            role: role.map(String::from),
        }
    }

    #[test]
    fn test_only_exact_admin_role_is_admin() {
        assert!(profile(Some("admin")).is_admin());

        for role in [None, Some(""), Some("Admin"), Some("ADMIN"), Some(" admin"), Some("editor")] {
            assert!(!profile(role).is_admin(), "role {role:?} must not be admin");
        }
    }
}
