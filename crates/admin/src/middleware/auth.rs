//! Authentication extractors and session helpers for the admin panel.
//!
//! Every route except the login page requires a logged-in admin. Rejections
//! are shaped by the request: API-style endpoints (the JSON toggles and
//! inline-edit fetches) get a 401 JSON body, page requests get a redirect
//! to the login form.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAdmin, Toast, session::keys};

/// Extractor that requires admin authentication.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.full_name)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when admin authentication is required but missing.
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// 401 with a JSON body (for API requests).
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/admin").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "success": false,
                    "message": "Admin session expired",
                })),
            )
                .into_response(),
        }
    }
}

/// Whether an unauthenticated request should get a JSON 401 instead of a
/// redirect. True for anything that declares a JSON appetite and for the
/// endpoints only ever called from fetch().
fn is_api_request(parts: &Parts) -> bool {
    let accepts_json = parts
        .headers
        .get(axum::http::header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    let path = parts.uri.path();
    accepts_json
        || path.starts_with("/admin/users/")
        || path.starts_with("/admin/category/")
        || path.starts_with("/admin/style/")
        || path.starts_with("/admin/toggle-")
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        // Get the current admin from the session
        let admin: CurrentAdmin = session
            .get(keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| {
                if is_api_request(parts) {
                    AdminAuthRejection::Unauthorized
                } else {
                    AdminAuthRejection::RedirectToLogin
                }
            })?;

        Ok(Self(admin))
    }
}

/// Extractor that optionally gets the current admin.
///
/// Used by the login page to bounce already-authenticated admins to the
/// dashboard.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(admin))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}

/// Store a one-shot toast for the next page render.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_toast(
    session: &Session,
    toast: &Toast,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::TOAST, toast).await
}

/// Take the pending toast out of the session, if any.
///
/// Removal is what makes the message one-shot: a reload after the first
/// render shows a clean page.
pub async fn take_toast(session: &Session) -> Option<Toast> {
    session.remove::<Toast>(keys::TOAST).await.ok().flatten()
}
