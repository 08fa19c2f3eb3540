//! Moderation console route handlers.
//!
//! The listing page is rendered once per filter and cached; status changes
//! go through [`crate::services::moderation`], which clears that cache.

use std::sync::Arc;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use localguide_core::SubmissionStatus;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::ListingQuery;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, access_token, denial_redirect};
use crate::models::Submission;
use crate::services::moderation::ModerationError;
use crate::state::AppState;

/// Listing path; also the post-login destination after a denied write.
pub const LISTING_PATH: &str = "/admin/submissions";

/// One row of the listing.
pub struct SubmissionView {
    pub id: String,
    pub business_name: String,
    pub contact_email: String,
    pub phone: String,
    pub website: String,
    pub location: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub submitted_on: String,
}

impl From<&Submission> for SubmissionView {
    fn from(submission: &Submission) -> Self {
        let location = [submission.address.as_deref(), submission.city.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            id: submission.id.to_string(),
            business_name: submission.business_name.clone(),
            contact_email: submission.contact_email.clone().unwrap_or_default(),
            phone: submission.phone.clone().unwrap_or_default(),
            website: submission.website.clone().unwrap_or_default(),
            location,
            status: submission.status.as_str(),
            status_label: submission.status.label(),
            submitted_on: submission.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Status filter tab.
pub struct FilterTab {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// Moderation listing template.
#[derive(Template)]
#[template(path = "admin/submissions.html")]
pub struct SubmissionsTemplate {
    pub submissions: Vec<SubmissionView>,
    pub filters: Vec<FilterTab>,
    pub statuses: Vec<SubmissionStatus>,
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingParams {
    pub status: Option<String>,
}

/// Moderation form data.
///
/// Missing fields deserialize as empty so they fail validation with the
/// workflow's own messages rather than a form rejection.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
}

/// Build the moderation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(LISTING_PATH, get(list))
        .route("/admin/submissions/status", post(update_status))
}

/// Parse the listing filter. Absent, empty, or `all` lists every status.
fn parse_filter(raw: Option<&str>) -> Result<Option<SubmissionStatus>> {
    match raw {
        None | Some("" | "all") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest("Invalid status filter.".to_string())),
    }
}

fn filter_tabs(active: Option<SubmissionStatus>) -> Vec<FilterTab> {
    let mut tabs = vec![FilterTab {
        label: "All",
        href: LISTING_PATH.to_string(),
        active: active.is_none(),
    }];
    tabs.extend(SubmissionStatus::ALL.iter().map(|status| FilterTab {
        label: status.label(),
        href: format!("{LISTING_PATH}?status={}", status.as_str()),
        active: active == Some(*status),
    }));
    tabs
}

/// Render the moderation listing.
///
/// GET /admin/submissions[?status=pending|approved|denied]
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(params): Query<ListingParams>,
) -> Result<Html<String>> {
    let status = parse_filter(params.status.as_deref())?;
    let query = ListingQuery {
        status,
        site_id: state.config().site_id.clone(),
    };

    if let Some(html) = state.listing_cache().get(&query).await {
        tracing::debug!("Cache hit for moderation listing");
        return Ok(Html(html.to_string()));
    }

    let generation = state.listing_cache().generation();
    let submissions = state.submissions().list(&query).await?;
    let html = SubmissionsTemplate {
        submissions: submissions.iter().map(SubmissionView::from).collect(),
        filters: filter_tabs(status),
        statuses: SubmissionStatus::ALL.to_vec(),
    }
    .render()?;

    state
        .listing_cache()
        .insert(generation, query, Arc::from(html.as_str()))
        .await;
    Ok(Html(html))
}

/// Apply a moderation decision.
///
/// POST /admin/submissions/status
#[instrument(skip(state, session, form), fields(submission_id = %form.id, status = %form.status))]
async fn update_status(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let token = access_token(&session).await;

    match state
        .moderation()
        .set_status(token.as_deref(), &form.id, &form.status)
        .await
    {
        Ok(_) => Ok(Redirect::to(LISTING_PATH).into_response()),
        Err(e @ (ModerationError::MissingId | ModerationError::InvalidStatus)) => {
            Err(AppError::BadRequest(e.to_string()))
        }
        Err(ModerationError::Unauthorized(denial)) => {
            Ok(denial_redirect(state.config(), LISTING_PATH, denial))
        }
        Err(ModerationError::Store(e)) => Err(AppError::ModerationFailed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(parse_filter(None).ok(), Some(None));
        assert_eq!(parse_filter(Some("")).ok(), Some(None));
        assert_eq!(parse_filter(Some("all")).ok(), Some(None));
        assert_eq!(
            parse_filter(Some("denied")).ok(),
            Some(Some(SubmissionStatus::Denied))
        );
        assert!(parse_filter(Some("archived")).is_err());
    }

    #[test]
    fn test_filter_tabs_mark_active() {
        let tabs = filter_tabs(Some(SubmissionStatus::Approved));
        assert_eq!(tabs.len(), SubmissionStatus::ALL.len() + 1);
        let active: Vec<_> = tabs.iter().filter(|tab| tab.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].href, "/admin/submissions?status=approved");
    }
}
