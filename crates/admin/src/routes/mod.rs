//! HTTP route handlers for the admin panel.
//!
//! # Route Structure
//!
//! ```text
//! GET  /admin                          - Login page
//! POST /admin                          - Login action
//! GET  /admin/logout                   - Logout
//! GET  /admin/health                   - Health check
//!
//! # Dashboard
//! GET  /admin/dashboard                - Counts overview
//!
//! # Customers
//! GET  /admin/customers                - Listing (search, sort, pagination)
//! PATCH /admin/users/{id}/toggle-block - Block/unblock (JSON)
//!
//! # Categories
//! GET  /admin/categories               - List + add form
//! POST /admin/add-category             - Add
//! POST /admin/delete-category/{id}     - Hard delete
//! PATCH /admin/toggle-category/{id}    - List/unlist (JSON)
//! GET  /admin/category/{id}            - Fetch for inline edit (JSON)
//! PATCH /admin/category/{id}           - Inline edit (JSON)
//!
//! # Styles (mirror categories)
//! GET  /admin/styles
//! POST /admin/add-style
//! POST /admin/delete-style/{id}
//! PATCH /admin/toggle-style/{id}
//! GET  /admin/style/{id}
//! PATCH /admin/style/{id}
//! ```
//!
//! All handlers except the login page and health check require a logged-in
//! admin via the `RequireAdminAuth` extractor.

pub mod auth;
pub mod catalog;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod styles;

use axum::{
    Router,
    routing::{get, patch, post},
};
use serde::Serialize;

use crate::state::AppState;

/// JSON failure body shared by the API-style endpoints.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    /// Build a `{success: false, message}` body.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Health check for the admin surface.
async fn health() -> &'static str {
    "ok"
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(auth::login_page).post(auth::login))
        .route("/admin/logout", get(auth::logout))
        .route("/admin/health", get(health))
        .route("/admin/dashboard", get(dashboard::dashboard))
        // Customers
        .route("/admin/customers", get(customers::index))
        .route(
            "/admin/users/{id}/toggle-block",
            patch(customers::toggle_block),
        )
        // Categories
        .route("/admin/categories", get(categories::index))
        .route("/admin/add-category", post(categories::add))
        .route("/admin/delete-category/{id}", post(categories::delete))
        .route("/admin/toggle-category/{id}", patch(categories::toggle))
        .route(
            "/admin/category/{id}",
            get(categories::get_json).patch(categories::update_json),
        )
        // Styles
        .route("/admin/styles", get(styles::index))
        .route("/admin/add-style", post(styles::add))
        .route("/admin/delete-style/{id}", post(styles::delete))
        .route("/admin/toggle-style/{id}", patch(styles::toggle))
        .route(
            "/admin/style/{id}",
            get(styles::get_json).patch(styles::update_json),
        )
}
