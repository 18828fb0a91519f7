//! Authentication route handlers for the admin panel.
//!
//! Password login against the shared `users` table plus logout. Login
//! failures render straight back into the form with the specific reason;
//! this is an internal tool, so there is no anti-enumeration blurring here.

use askama::Template;
use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin, set_toast};
use crate::models::{CurrentAdmin, Toast};
use crate::services::auth::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Admin login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Present after a logout redirect (`/admin?logout=1`).
    pub logout: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: Option<String>,
    logged_out: bool,
}

fn render_login(error: Option<String>, logged_out: bool) -> Response {
    let template = LoginTemplate { error, logged_out };
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the admin login page.
///
/// A logged-in admin is sent straight to the dashboard.
///
/// # Route
///
/// `GET /admin`
pub async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Query(query): Query<LoginQuery>,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/admin/dashboard").into_response();
    }

    render_login(None, query.logout.is_some())
}

/// Handle the admin login form submission.
///
/// # Route
///
/// `POST /admin`
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let service = AdminAuthService::new(state.pool());

    let account = match service.login(&form.email, &form.password).await {
        Ok(account) => account,
        Err(
            err @ (AdminAuthError::Validation(_)
            | AdminAuthError::NotFound
            | AdminAuthError::NotAnAdmin
            | AdminAuthError::Blocked
            | AdminAuthError::PasswordLoginUnavailable
            | AdminAuthError::InvalidPassword),
        ) => {
            return render_login(Some(err.to_string()), false);
        }
        Err(err) => {
            tracing::error!("Admin login failed: {}", err);
            return render_login(
                Some("Something went wrong. Please try again.".to_string()),
                false,
            );
        }
    };

    set_sentry_user(account.id.as_i32(), Some(account.email.as_str()));

    let current = CurrentAdmin {
        id: account.id,
        email: account.email,
        full_name: account.full_name,
    };

    if let Err(e) = set_current_admin(&session, &current).await {
        tracing::error!("Failed to store admin session: {}", e);
        return render_login(
            Some("Could not start a session. Please try again.".to_string()),
            false,
        );
    }

    if let Err(e) = set_toast(&session, &Toast::success("Admin logged in successfully")).await {
        tracing::error!("Failed to store toast: {}", e);
    }

    tracing::info!(admin_id = %current.id, "Admin logged in");

    Redirect::to("/admin/dashboard").into_response()
}

/// Log the admin out and clear the session.
///
/// # Route
///
/// `GET /admin/logout`
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!("Failed to clear admin session: {}", e);
    }

    clear_sentry_user();

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    Redirect::to("/admin?logout=1")
}
