//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                             - Liveness check
//! GET  /health/ready                       - Store connectivity check
//!
//! # Admin
//! GET  /admin                              - Redirect to the listing
//! GET  /admin/login                        - Sign-in page
//! POST /admin/login                        - Password sign-in
//! POST /admin/logout                       - Sign out
//! GET  /admin/submissions                  - Moderation listing (?status=)
//! POST /admin/submissions/status           - Set a submission's status
//!
//! # Payments (JSON)
//! GET  /api/payments/services              - Public price list
//! POST /api/payments/service-intent        - { serviceId } -> { clientSecret }
//! POST /api/payments/featured-listing-intent - { email } -> { clientSecret }
//! POST /api/payments/claim-listing-intent  - { email } -> { clientSecret }
//! ```

pub mod auth;
pub mod health;
pub mod payments;
pub mod submissions;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth::router())
        .merge(submissions::router())
        .nest("/api/payments", payments::router())
}
