//! Directory submission domain types.

use chrono::{DateTime, Utc};

use localguide_core::{SubmissionId, SubmissionStatus};

/// A business listing submitted through the public intake flow.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: SubmissionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub business_name: String,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub status: SubmissionStatus,
    /// Site that owns the submission.
    pub site_id: Option<String>,
}

/// Result of a moderation write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub id: SubmissionId,
    pub status: SubmissionStatus,
    /// Rows matched by the update. Zero means no submission has that id.
    pub rows_updated: u64,
}
