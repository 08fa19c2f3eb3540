//! Submission moderation workflow.
//!
//! A status change is validated, authorized, written, and then the cached
//! listing is invalidated, in that order. Input errors are reported before
//! the identity service or the store is touched.

use localguide_core::{SubmissionId, SubmissionStatus};
use thiserror::Error;
use tracing::instrument;

use crate::db::{ProfileStore, RepositoryError, SubmissionStore};
use crate::models::StatusChange;
use crate::services::auth::{AdminAccess, AdminGate, Denial};
use crate::services::identity::IdentityProvider;
use crate::services::listing_cache::ListingCache;

/// Why a moderation action did not complete.
#[derive(Debug, Error)]
pub enum ModerationError {
    /// The submission id was empty or whitespace.
    #[error("Missing id.")]
    MissingId,

    /// The requested status is not one of the known states.
    #[error("Invalid status.")]
    InvalidStatus,

    /// The caller is not an administrator.
    #[error("admin access denied: {}", .0.reason())]
    Unauthorized(Denial),

    /// The store rejected or failed the write.
    #[error("{0}")]
    Store(#[from] RepositoryError),
}

/// Moderation workflow over injected ports.
pub struct ModerationWorkflow<'a> {
    gate: AdminGate<'a>,
    submissions: &'a dyn SubmissionStore,
    listing_cache: &'a ListingCache,
}

impl<'a> ModerationWorkflow<'a> {
    #[must_use]
    pub const fn new(
        identity: &'a dyn IdentityProvider,
        profiles: &'a dyn ProfileStore,
        submissions: &'a dyn SubmissionStore,
        listing_cache: &'a ListingCache,
    ) -> Self {
        Self {
            gate: AdminGate::new(identity, profiles),
            submissions,
            listing_cache,
        }
    }

    /// Set a submission's status on behalf of the session holder.
    ///
    /// Any state may move to any other state, including itself. An update
    /// that matches no row still succeeds; `rows_updated` reports it.
    ///
    /// # Errors
    ///
    /// - [`ModerationError::MissingId`] / [`ModerationError::InvalidStatus`]
    ///   before any external call
    /// - [`ModerationError::Unauthorized`] when the gate denies; the store is
    ///   not called
    /// - [`ModerationError::Store`] when the write fails; not retried
    #[instrument(skip(self, access_token))]
    pub async fn set_status(
        &self,
        access_token: Option<&str>,
        raw_id: &str,
        raw_status: &str,
    ) -> Result<StatusChange, ModerationError> {
        let id = SubmissionId::parse(raw_id).map_err(|_| ModerationError::MissingId)?;
        let status = raw_status
            .parse::<SubmissionStatus>()
            .map_err(|_| ModerationError::InvalidStatus)?;

        let admin = match self.gate.check(access_token).await {
            AdminAccess::Authorized(admin) => admin,
            AdminAccess::Unauthorized(denial) => return Err(ModerationError::Unauthorized(denial)),
        };

        let rows_updated = self.submissions.set_status(&id, status).await?;
        if rows_updated == 0 {
            tracing::warn!(submission_id = %id, "Status update matched no submission");
        } else {
            tracing::info!(
                submission_id = %id,
                status = %status,
                admin_id = %admin.user_id,
                "Submission status updated"
            );
        }

        self.listing_cache.invalidate_all();

        Ok(StatusChange {
            id,
            status,
            rows_updated,
        })
    }
}
