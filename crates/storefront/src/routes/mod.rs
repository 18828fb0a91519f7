//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to /home or /login
//! GET  /health                 - Health check
//!
//! # Auth (guest pages redirect logged-in visitors to /home)
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /signup                 - Signup page
//! POST /signup                 - Begin signup (sends verification code)
//! GET  /verify-otp             - Code entry page (all three flows)
//! POST /verify-otp             - Check code for whichever flow is pending
//! POST /resend-otp             - Resend the active code (JSON)
//! GET  /forgot-password        - Password reset request page
//! POST /forgot-password        - Begin password reset
//! GET  /reset-password         - New password page
//! POST /reset-password         - Complete password reset
//! GET  /logout                 - Logout
//!
//! # Google OAuth
//! GET  /auth/google/login      - Redirect to Google consent page
//! GET  /auth/google/callback   - Handle OAuth callback
//!
//! # Account (requires auth; blocked accounts evicted per request)
//! GET  /home                   - Landing page
//! GET  /profile                - Profile view
//! GET  /edit                   - Profile edit form
//! POST /update                 - Profile update (multipart, one image)
//! GET  /reset-email            - Begin email change (sends code to current address)
//! GET  /email-reset            - Enter-new-email page
//! POST /email-reset            - Submit candidate address
//! GET  /address                - Address list
//! GET  /address/add            - New address form
//! POST /address/add            - Create address
//! GET  /address/edit/{id}      - Edit address form
//! POST /address/edit/{id}      - Update address
//! POST /address/delete/{id}    - Delete address
//! ```

pub mod address;
pub mod auth;
pub mod google_auth;
pub mod home;
pub mod profile;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::middleware::enforce_not_blocked;
use crate::services::uploads::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Create the auth routes router (open to guests).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/verify-otp", get(auth::verify_otp_page).post(auth::verify_otp))
        .route("/resend-otp", post(auth::resend_otp))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/reset-password",
            get(auth::reset_password_page).post(auth::reset_password),
        )
        .route("/logout", get(auth::logout))
        // Google OAuth
        .route("/auth/google/login", get(google_auth::login))
        .route("/auth/google/callback", get(google_auth::callback))
}

/// Create the account routes router (requires auth).
///
/// The blocked-account middleware wraps the whole group so an admin block
/// takes effect on the very next request.
pub fn account_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/home", get(home::home))
        .route("/profile", get(profile::show))
        .route("/edit", get(profile::edit))
        .route(
            "/update",
            // Multipart body carries the profile image; leave headroom above the
            // image cap for the other form fields.
            post(profile::update).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)),
        )
        .route("/reset-email", get(auth::begin_email_change))
        .route(
            "/email-reset",
            get(auth::email_reset_page).post(auth::submit_new_email),
        )
        .route("/address", get(address::index))
        .route("/address/add", get(address::add_page).post(address::create))
        .route(
            "/address/edit/{id}",
            get(address::edit_page).post(address::update),
        )
        .route("/address/delete/{id}", post(address::delete))
        .layer(from_fn_with_state(state, enforce_not_blocked))
}

/// Create all routes for the storefront.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(home::root))
        .merge(auth_routes())
        .merge(account_routes(state))
}
