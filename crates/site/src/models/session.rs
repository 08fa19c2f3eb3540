//! Session-related types for admin authentication.
//!
//! Types stored in the server-side session for authentication state.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Tokens issued by the identity service after sign-in.
///
/// The identity service remains the authority on whether the access token
/// is valid; `expires_at` only lets the site drop a token it already knows
/// to be stale without a round trip.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Bearer token presented to the identity service.
    pub access_token: String,
    /// When the access token expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthTokens {
    /// Tokens granted at `now` with a lifetime of `expires_in` seconds.
    ///
    /// A lifetime that is negative or does not fit a timestamp is treated
    /// as unknown.
    #[must_use]
    pub fn issued(access_token: String, expires_in: Option<i64>, now: DateTime<Utc>) -> Self {
        let expires_at = expires_in
            .filter(|secs| *secs >= 0)
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime));

        Self {
            access_token,
            expires_at,
        }
    }

    /// Whether the access token is past its known expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the identity-service tokens of the signed-in user.
    pub const AUTH_TOKENS: &str = "auth_tokens";
}
