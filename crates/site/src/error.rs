//! Unified error handling with Sentry integration.
//!
//! HTML and form routes return `Result<T, AppError>`. The JSON payment API
//! has its own error type in [`crate::routes::payments`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::identity::IdentityError;

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Identity service call failed.
    #[error("Identity service error: {0}")]
    Identity(#[from] IdentityError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// A moderation write failed in the store. The message is shown to the
    /// admin as-is.
    #[error("{0}")]
    ModerationFailed(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_)
            | Self::Template(_)
            | Self::Session(_)
            | Self::ModerationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Identity(_) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match self {
            Self::Database(_) | Self::Template(_) | Self::Session(_) => {
                "Internal server error".to_string()
            }
            Self::Identity(_) => "Authentication service error".to_string(),
            Self::ModerationFailed(message) | Self::BadRequest(message) => message,
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for an authorized admin.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the admin.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::ModerationFailed("permission denied: policy".to_string());
        assert_eq!(err.to_string(), "permission denied: policy");

        let err = AppError::BadRequest("Missing id.".to_string());
        assert_eq!(err.to_string(), "Bad request: Missing id.");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::ModerationFailed("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::PermissionDenied(
                "test".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Identity(IdentityError::InvalidCredentials)),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_bad_request_body_is_bare_message() {
        let response = AppError::BadRequest("Invalid status.".to_string()).into_response();
        assert_eq!(body_text(response).await, "Invalid status.");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response =
            AppError::Database(RepositoryError::DataCorruption("row 7".to_string())).into_response();
        assert_eq!(body_text(response).await, "Internal server error");

        let response = AppError::ModerationFailed("permission denied: policy".to_string())
            .into_response();
        assert_eq!(body_text(response).await, "permission denied: policy");
    }
}
