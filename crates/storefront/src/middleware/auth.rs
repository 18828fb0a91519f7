//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in customer in route handlers,
//! plus the session helpers for the current user and the pending
//! verification flow.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use marigold_core::PendingAction;

use crate::models::session::{CurrentUser, keys};

/// Extractor that requires a logged-in customer.
///
/// If nobody is logged in, browser requests are redirected to the login
/// page and API-shaped requests get a plain 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.full_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is logged in.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        // Get the current user from the session
        let user: CurrentUser = session
            .get(keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                // API-shaped requests get a bare 401 instead of a redirect
                let is_api = parts.uri.path().starts_with("/api/");
                if is_api {
                    AuthRejection::Unauthorized
                } else {
                    AuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is
/// logged in. Guest-only pages use it to bounce logged-in visitors away.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CurrentUser>(keys::CURRENT_USER).await?;
    Ok(())
}

/// Load the pending verification flow, if the session holds one.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn load_pending_action(
    session: &Session,
) -> Result<Option<PendingAction>, tower_sessions::session::Error> {
    session.get(keys::PENDING_ACTION).await
}

/// Store (or replace) the pending verification flow.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_pending_action(
    session: &Session,
    action: &PendingAction,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::PENDING_ACTION, action).await
}

/// Drop the pending verification flow (on success or expiry).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_pending_action(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.remove::<PendingAction>(keys::PENDING_ACTION).await?;
    Ok(())
}
