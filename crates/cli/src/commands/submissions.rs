//! Inspect the moderation queue.
//!
//! Read-only: status changes go through the admin console so they pass the
//! authorization gate.
//!
//! # Usage
//!
//! ```bash
//! lg-cli submissions list
//! lg-cli submissions list --status pending --limit 20
//! ```

use chrono::{DateTime, Utc};
use localguide_core::SubmissionStatus;
use secrecy::ExposeSecret;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{CommandError, database_url};

#[derive(Debug, sqlx::FromRow)]
struct SubmissionLine {
    id: String,
    business_name: String,
    city: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

/// List submissions, newest first.
pub async fn list(status: Option<SubmissionStatus>, limit: i64) -> Result<(), CommandError> {
    let database_url = database_url()?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
        "SELECT id, business_name, city, status, created_at FROM submissions WHERE TRUE",
    );
    if let Some(status) = status {
        builder.push(" AND status = ").push_bind(status);
    }
    builder
        .push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(limit.max(1));

    let rows = builder
        .build_query_as::<SubmissionLine>()
        .fetch_all(&pool)
        .await?;

    print_rows(&rows);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_rows(rows: &[SubmissionLine]) {
    if rows.is_empty() {
        println!("No submissions found.");
        return;
    }

    println!(
        "{:<24} {:<32} {:<16} {:<10} {}",
        "ID", "BUSINESS", "CITY", "STATUS", "SUBMITTED"
    );
    for row in rows {
        println!(
            "{:<24} {:<32} {:<16} {:<10} {}",
            row.id,
            row.business_name,
            row.city.as_deref().unwrap_or("-"),
            row.status,
            row.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}
