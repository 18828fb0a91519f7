//! Blocked-account enforcement.
//!
//! An admin can block an account while one of its sessions is live, so the
//! login-time check is not enough: protected routes re-check the flag on
//! every request. A blocked visitor's session is flushed and the request
//! bounced to the login page.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::users::UserRepository;
use crate::models::session::{CurrentUser, keys};
use crate::state::AppState;

/// Middleware that evicts blocked accounts.
///
/// Requests without a logged-in user pass through untouched; `RequireAuth`
/// decides what happens to them. A repository failure also passes through:
/// the handler will hit the same database and fail with a proper 500.
pub async fn enforce_not_blocked(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let Some(user) = session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
    else {
        return next.run(request).await;
    };

    match UserRepository::new(state.pool()).is_blocked(user.id).await {
        Ok(Some(false)) => next.run(request).await,
        Ok(Some(true) | None) => {
            tracing::info!(user_id = %user.id, "Blocked account evicted");
            if let Err(e) = session.flush().await {
                tracing::error!("Failed to flush session for blocked account: {}", e);
            }
            let message = urlencoding::encode("Your account has been blocked. Please contact support.");
            Redirect::to(&format!("/login?error={message}")).into_response()
        }
        Err(e) => {
            tracing::error!("Blocked-account check failed: {}", e);
            next.run(request).await
        }
    }
}
