//! Admin authentication extractor and session helpers.
//!
//! The access token issued by the identity service lives in the server-side
//! session. [`RequireAdmin`] runs the authorization gate on it and turns a
//! denial into a redirect to the login page.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use crate::config::SiteConfig;
use crate::error::set_sentry_user;
use crate::models::{AuthTokens, session_keys};
use crate::services::auth::{AdminAccess, AdminPrincipal, Denial, login_redirect_url};
use crate::state::AppState;

/// Extractor that requires an authenticated administrator.
///
/// Rejects with a 303 redirect to `/admin/login?next=<current path>`, plus
/// `forbidden=1` when the caller is signed in but not an admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.user_id)
/// }
/// ```
pub struct RequireAdmin(pub AdminPrincipal);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let next = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());

        let token = match parts.extensions.get::<Session>() {
            Some(session) => access_token(session).await,
            None => None,
        };

        match state.admin_gate().check(token.as_deref()).await {
            AdminAccess::Authorized(admin) => {
                set_sentry_user(&admin.user_id, admin.email.as_deref());
                Ok(Self(admin))
            }
            AdminAccess::Unauthorized(denial) => Err(denial_redirect(state.config(), &next, denial)),
        }
    }
}

/// Redirect a denied request to the login page.
///
/// The `reason` token is only exposed outside production.
#[must_use]
pub fn denial_redirect(config: &SiteConfig, next: &str, denial: Denial) -> Response {
    let url = login_redirect_url(next, denial, !config.is_production());
    Redirect::to(&url).into_response()
}

/// Read the access token from the session.
///
/// A session that cannot be read, or whose token is past its known expiry,
/// counts as signed out.
pub async fn access_token(session: &Session) -> Option<String> {
    match session.get::<AuthTokens>(session_keys::AUTH_TOKENS).await {
        Ok(Some(tokens)) if tokens.is_expired(Utc::now()) => {
            tracing::debug!("Session access token has expired");
            None
        }
        Ok(tokens) => tokens.map(|t| t.access_token),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read auth tokens from session");
            None
        }
    }
}

/// Store identity-service tokens after a successful sign-in.
///
/// The session id is rotated first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_tokens(
    session: &Session,
    tokens: &AuthTokens,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::AUTH_TOKENS, tokens).await
}

/// Remove tokens and end the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_auth_tokens(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<AuthTokens>(session_keys::AUTH_TOKENS).await?;
    session.flush().await
}
