//! Submission repository: listing and status writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use localguide_core::{SubmissionId, SubmissionStatus};

use super::RepositoryError;
use crate::models::Submission;

/// Maximum rows shown on one listing page.
pub const LISTING_LIMIT: i64 = 200;

/// Filters for the moderation listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListingQuery {
    /// Only submissions in this state; all states when `None`.
    pub status: Option<SubmissionStatus>,
    /// Only submissions owned by this site; all sites when `None`.
    pub site_id: Option<String>,
}

/// Port for reading and moderating submissions in the external store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// List submissions, newest first.
    async fn list(&self, query: &ListingQuery) -> Result<Vec<Submission>, RepositoryError>;

    /// Set the status of one submission, matched by id.
    ///
    /// Writes only the status column and performs no version check, so
    /// concurrent writers resolve as last-write-wins. Returns the number of
    /// rows matched.
    async fn set_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
    ) -> Result<u64, RepositoryError>;

    /// Verify the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SubmissionRow {
    id: SubmissionId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    business_name: String,
    contact_email: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    address: Option<String>,
    city: Option<String>,
    status: String,
    site_id: Option<String>,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = RepositoryError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<SubmissionStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("submission {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            business_name: row.business_name,
            contact_email: row.contact_email,
            phone: row.phone,
            website: row.website,
            address: row.address,
            city: row.city,
            status,
            site_id: row.site_id,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` implementation of [`SubmissionStore`].
#[derive(Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    /// Create a new submission repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn list(&self, query: &ListingQuery) -> Result<Vec<Submission>, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            r"
            SELECT id, created_at, updated_at, business_name, contact_email,
                   phone, website, address, city, status, site_id
            FROM submissions
            WHERE TRUE
            ",
        );
        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(site_id) = &query.site_id {
            builder.push(" AND site_id = ").push_bind(site_id.clone());
        }
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(LISTING_LIMIT);

        let rows = builder
            .build_query_as::<SubmissionRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn set_status(
        &self,
        id: &SubmissionId,
        status: SubmissionStatus,
    ) -> Result<u64, RepositoryError> {
        // updated_at is maintained by the submissions_touch_updated_at trigger
        let result = sqlx::query("UPDATE submissions SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;
        Ok(())
    }
}
