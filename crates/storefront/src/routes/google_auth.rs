//! Google OAuth route handlers.
//!
//! Handles the OAuth flow for Google sign-in:
//! - Login: Redirects to Google's OAuth authorization page
//! - Callback: Validates state, exchanges the code, and resolves the account
//!
//! Accounts are matched by Google subject first, then by email; a verified
//! email that belongs to an unlinked account gets linked on first sign-in.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::middleware::{clear_pending_action, set_current_user};
use crate::models::CurrentUser;
use crate::models::session::keys;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
}

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Initiate Google OAuth login.
///
/// Generates a state parameter, stores it in the session, and redirects to
/// Google's authorization page.
///
/// # Route
///
/// `GET /auth/google`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let Some(google) = state.google_client() else {
        tracing::warn!("Google sign-in attempted but OAuth is not configured");
        return Redirect::to("/login?error=google_disabled").into_response();
    };

    // Generate CSRF state
    let oauth_state = generate_random_string(32);

    // Store in session for validation on callback
    if let Err(e) = session.insert(keys::OAUTH_STATE, &oauth_state).await {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Redirect::to("/login?error=session").into_response();
    }

    Redirect::to(&google.authorization_url(&oauth_state)).into_response()
}

/// Handle the Google OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code for an
/// access token, fetches the user's profile, and logs the resolved account
/// in.
///
/// # Route
///
/// `GET /auth/google/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(google) = state.google_client() else {
        return Redirect::to("/login?error=google_disabled").into_response();
    };

    // Check for OAuth errors from Google
    if let Some(error) = query.error {
        tracing::warn!("Google OAuth error: {}", error);
        return Redirect::to("/login?error=google_denied").into_response();
    }

    // Verify we have an authorization code
    let Some(code) = query.code else {
        tracing::warn!("Google OAuth callback missing code");
        return Redirect::to("/login?error=missing_code").into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("Google OAuth callback missing state");
        return Redirect::to("/login?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session.get(keys::OAUTH_STATE).await.ok().flatten();
    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("Google OAuth state mismatch");
        return Redirect::to("/login?error=invalid_state").into_response();
    }

    // Clear the stored state (one-time use)
    if let Err(e) = session.remove::<String>(keys::OAUTH_STATE).await {
        tracing::error!("Failed to clear OAuth state: {}", e);
    }

    // Exchange code for an access token
    let access_token = match google.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to exchange Google OAuth code: {}", e);
            return Redirect::to("/login?error=token_exchange").into_response();
        }
    };

    // Fetch the user's Google profile
    let info = match google.get_user_info(&access_token).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("Failed to fetch Google user info: {}", e);
            return Redirect::to("/login?error=userinfo").into_response();
        }
    };

    // Resolve the Google identity to a local account
    let service = AuthService::new(state.pool());
    let user = match service.login_with_google(&info).await {
        Ok(user) => user,
        Err(
            err @ (AuthError::AccountBlocked
            | AuthError::FederatedIdentityConflict
            | AuthError::Validation(_)),
        ) => {
            return Redirect::to(&format!(
                "/login?error={}",
                urlencoding::encode(&err.to_string())
            ))
            .into_response();
        }
        Err(e) => {
            tracing::error!("Google sign-in failed: {}", e);
            return Redirect::to("/login?error=google_failed").into_response();
        }
    };

    let current = CurrentUser::from(&user);
    set_sentry_user(&current.id, Some(current.email.as_str()));
    if let Err(e) = set_current_user(&session, &current).await {
        tracing::error!("Failed to set session: {}", e);
        return Redirect::to("/login?error=session").into_response();
    }
    if let Err(e) = clear_pending_action(&session).await {
        tracing::warn!("Failed to clear pending action on login: {}", e);
    }

    tracing::info!(user_id = %current.id, "User logged in with Google");
    Redirect::to("/home").into_response()
}
