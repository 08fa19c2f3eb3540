//! Database access for the hosted `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `profiles` - Identity-service users and their role (read-only here)
//! - `submissions` - Directory listings awaiting or past moderation
//! - `tower_sessions.session` - Server-side admin sessions
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p localguide-cli -- migrate
//! ```
//!
//! Handlers never talk to `PgPool` directly: they go through the
//! [`SubmissionStore`] and [`ProfileStore`] ports so tests can substitute
//! in-memory doubles.

pub mod profiles;
pub mod submissions;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use profiles::{PgProfileStore, ProfileStore};
pub use submissions::{ListingQuery, PgSubmissionStore, SubmissionStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The store refused the operation (e.g. a row-level security policy).
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl RepositoryError {
    /// Classify a sqlx error, separating policy denials from other failures.
    ///
    /// `42501` is `insufficient_privilege`, raised when a row-level security
    /// policy or grant rejects the statement.
    #[must_use]
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.code().as_deref() == Some("42501")
        {
            return Self::PermissionDenied(db_err.message().to_string());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
