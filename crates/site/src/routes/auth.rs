//! Admin sign-in route handlers.
//!
//! Email/password sign-in against the hosted identity service. The issued
//! tokens are kept in the server-side session; the browser only holds the
//! session cookie.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user};
use crate::middleware::{access_token, clear_auth_tokens, set_auth_tokens};
use crate::services::auth::{LOGIN_PATH, sanitize_next};
use crate::services::identity::IdentityError;
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    /// Sanitized post-login destination.
    pub next: String,
    /// Signed in, but not an administrator.
    pub forbidden: bool,
    /// Denial token, shown outside production only.
    pub reason: Option<String>,
    pub email: String,
    pub error: Option<String>,
}

/// Query parameters set by the authorization redirect.
#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub next: Option<String>,
    pub forbidden: Option<String>,
    pub reason: Option<String>,
}

/// Sign-in form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_index))
        .route("/admin/login", get(login_page).post(login))
        .route("/admin/logout", post(logout))
}

async fn admin_index() -> Redirect {
    Redirect::to("/admin/submissions")
}

/// Render the login page.
///
/// GET /admin/login
#[instrument(skip(state))]
async fn login_page(
    State(state): State<AppState>,
    Query(params): Query<LoginParams>,
) -> LoginTemplate {
    let reason = if state.config().is_production() {
        None
    } else {
        params.reason
    };

    LoginTemplate {
        next: sanitize_next(params.next.as_deref()),
        forbidden: params.forbidden.as_deref() == Some("1"),
        reason,
        email: String::new(),
        error: None,
    }
}

/// Exchange credentials for tokens and start an admin session.
///
/// POST /admin/login
///
/// Only the identity service is consulted here. Whether the account is an
/// admin is decided by the gate on the page the user lands on.
#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = sanitize_next(form.next.as_deref());
    let email = form.email.trim().to_string();

    let retry = |message: &str| LoginTemplate {
        next: next.clone(),
        forbidden: false,
        reason: None,
        email: email.clone(),
        error: Some(message.to_string()),
    };

    if email.is_empty() || form.password.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            retry("Email and password are required."),
        )
            .into_response());
    }

    match state
        .identity()
        .sign_in_with_password(&email, &form.password)
        .await
    {
        Ok(tokens) => {
            set_auth_tokens(&session, &tokens).await?;
            tracing::info!("Admin sign-in succeeded");
            Ok(Redirect::to(&next).into_response())
        }
        Err(IdentityError::InvalidCredentials) => {
            tracing::info!("Admin sign-in rejected");
            Ok((
                StatusCode::UNAUTHORIZED,
                retry("Invalid email or password."),
            )
                .into_response())
        }
        Err(e) => Err(AppError::Identity(e)),
    }
}

/// Revoke the token and end the session.
///
/// POST /admin/logout
#[instrument(skip_all)]
async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    if let Some(token) = access_token(&session).await
        && let Err(e) = state.identity().sign_out(&token).await
    {
        tracing::warn!(error = %e, "Failed to revoke identity token");
    }

    clear_auth_tokens(&session).await?;
    clear_sentry_user();

    Ok(Redirect::to(LOGIN_PATH))
}
