//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Form handlers mostly render failures back into
//! their views; `AppError` is the fallback for everything that escapes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use marigold_core::FlowError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::flow::FlowServiceError;
use crate::services::google::GoogleError;
use crate::services::uploads::UploadError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Verification-flow rule violated.
    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    /// Google OAuth operation failed.
    #[error("OAuth error: {0}")]
    OAuth(#[from] GoogleError),

    /// Upload rejected or failed.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FlowServiceError> for AppError {
    fn from(e: FlowServiceError) -> Self {
        match e {
            FlowServiceError::Flow(err) => Self::Flow(err),
            FlowServiceError::Auth(err) => Self::Auth(err),
        }
    }
}

impl AppError {
    /// Whether this error is a server-side fault worth a Sentry event.
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Internal(_)
                | Self::OAuth(_)
                | Self::Upload(UploadError::Io(_))
                | Self::Auth(
                    AuthError::PasswordHash | AuthError::Repository(_) | AuthError::CodeDispatch(_)
                )
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::OAuth(_) => StatusCode::BAD_GATEWAY,
            Self::Flow(_) => StatusCode::BAD_REQUEST,
            Self::Upload(err) => match err {
                UploadError::TooLarge | UploadError::UnsupportedType => StatusCode::BAD_REQUEST,
                UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::Validation(_)
                | AuthError::FederatedAccountOnly
                | AuthError::UseFederatedLogin => StatusCode::BAD_REQUEST,
                AuthError::DuplicateEmail
                | AuthError::DuplicatePhone
                | AuthError::EmailTaken
                | AuthError::FederatedIdentityConflict => StatusCode::CONFLICT,
                AuthError::AccountNotFound => StatusCode::NOT_FOUND,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::AccountBlocked => StatusCode::FORBIDDEN,
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                AuthError::CodeDispatch(_) => StatusCode::BAD_GATEWAY,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::OAuth(_) => "Google sign-in failed. Please try again.".to_string(),
            Self::Flow(err) => err.to_string(),
            Self::Upload(err) => match err {
                UploadError::TooLarge | UploadError::UnsupportedType => err.to_string(),
                UploadError::Io(_) => "Internal server error".to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    "Internal server error".to_string()
                }
                AuthError::CodeDispatch(_) => {
                    "We could not send the verification email. Please try again.".to_string()
                }
                other => other.to_string(),
            },
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
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
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("address 7".to_string());
        assert_eq!(err.to_string(), "Not found: address 7");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_flow_errors_are_bad_requests() {
        assert_eq!(
            get_status(AppError::Flow(FlowError::InvalidCode)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Flow(FlowError::CodeExpired)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::AccountBlocked)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::DuplicateEmail)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_upload_errors_do_not_leak_io_details() {
        let io = UploadError::Io(std::io::Error::other("disk failure"));
        let response = AppError::Upload(io).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
