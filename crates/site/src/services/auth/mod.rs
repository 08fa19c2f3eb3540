//! Admin authorization gate.
//!
//! Decides whether the caller behind an access token is an administrator.
//! The decision is returned as a value ([`AdminAccess`]); turning a denial
//! into an HTTP redirect is the job of the route layer (see
//! [`crate::middleware::RequireAdmin`]).
//!
//! The gate is fail-closed: the only path to [`AdminAccess::Authorized`] is
//! "identity service knows the user, exactly one profile row exists, and its
//! role is `admin`". Everything else, including lookup errors, denies.

pub mod redirect;

use tracing::instrument;
use uuid::Uuid;

use crate::db::ProfileStore;
use crate::services::identity::IdentityProvider;

pub use redirect::{LOGIN_PATH, login_redirect_url, sanitize_next};

/// An authenticated administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPrincipal {
    /// Identity-service user id.
    pub user_id: Uuid,
    /// Profile email, else identity-service email, else `None`.
    pub email: Option<String>,
}

/// Why the gate denied access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No access token, or the identity service does not recognize it.
    NoSession,
    /// The identity service lookup failed.
    IdentityUnavailable,
    /// The profile lookup failed (including store permission denials).
    ProfileLookupFailed,
    /// No profile row exists for the user.
    NoProfile,
    /// The profile role is null or not exactly `admin`.
    NotAdmin,
}

impl Denial {
    /// Whether the caller was identified but is not allowed in.
    ///
    /// All profile-stage failures are reported identically as forbidden.
    #[must_use]
    pub const fn is_forbidden(self) -> bool {
        matches!(self, Self::ProfileLookupFailed | Self::NoProfile | Self::NotAdmin)
    }

    /// Short token for operator debugging.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::NoSession => "no_session",
            Self::IdentityUnavailable => "identity_error",
            Self::ProfileLookupFailed => "profile_error",
            Self::NoProfile => "no_profile",
            Self::NotAdmin => "not_admin",
        }
    }
}

/// Outcome of an admin authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAccess {
    Authorized(AdminPrincipal),
    Unauthorized(Denial),
}

/// Authorization gate over injected identity and profile ports.
#[derive(Clone, Copy)]
pub struct AdminGate<'a> {
    identity: &'a dyn IdentityProvider,
    profiles: &'a dyn ProfileStore,
}

impl<'a> AdminGate<'a> {
    /// Create a gate over the given collaborators.
    #[must_use]
    pub const fn new(identity: &'a dyn IdentityProvider, profiles: &'a dyn ProfileStore) -> Self {
        Self { identity, profiles }
    }

    /// Check whether the holder of `access_token` is an administrator.
    ///
    /// Performs at most one identity lookup and one profile lookup, and no
    /// writes.
    #[instrument(skip_all)]
    pub async fn check(&self, access_token: Option<&str>) -> AdminAccess {
        let Some(token) = access_token else {
            return deny(Denial::NoSession);
        };

        let user = match self.identity.current_user(token).await {
            Ok(Some(user)) => user,
            Ok(None) => return deny(Denial::NoSession),
            Err(e) => {
                tracing::debug!(error = %e, "Identity lookup failed");
                return deny(Denial::IdentityUnavailable);
            }
        };

        let profile = match self.profiles.find_by_id(user.id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return deny(Denial::NoProfile),
            Err(e) => {
                tracing::debug!(user_id = %user.id, error = %e, "Profile lookup failed");
                return deny(Denial::ProfileLookupFailed);
            }
        };

        if !profile.is_admin() {
            tracing::debug!(user_id = %user.id, "Profile role is not admin");
            return deny(Denial::NotAdmin);
        }

        AdminAccess::Authorized(AdminPrincipal {
            user_id: user.id,
            email: profile.email.or(user.email),
        })
    }
}

fn deny(denial: Denial) -> AdminAccess {
    tracing::warn!(reason = denial.reason(), "Admin access denied");
    AdminAccess::Unauthorized(denial)
}
