//! Local Guide site library.
//!
//! The binary in `main.rs` wires real collaborators into [`app`]; the
//! integration tests wire in-memory ones.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Static assets directory, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/site/static";

/// Build the application: all routes, static files, and security headers.
///
/// The caller adds the session layer (Postgres in production, in-memory in
/// tests) and any outer tracing layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .with_state(state)
}
