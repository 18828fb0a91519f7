//! Dashboard route handler.

use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{CatalogRepository, UserRepository};
use crate::filters;
use crate::middleware::{RequireAdminAuth, take_toast};
use crate::models::{CurrentAdmin, Toast};
use crate::state::AppState;

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.full_name.clone(),
            email: admin.email.to_string(),
        }
    }
}

/// Dashboard counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardMetrics {
    pub customers: i64,
    pub categories: i64,
    pub styles: i64,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub metrics: DashboardMetrics,
    pub toast: Option<Toast>,
}

/// Dashboard page handler.
///
/// A count query that fails renders as zero rather than failing the whole
/// page; the dashboard is an overview, not a source of truth.
///
/// # Route
///
/// `GET /admin/dashboard`
#[instrument(skip(admin, state, session))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Response {
    let users = UserRepository::new(state.pool());
    let categories = CatalogRepository::categories(state.pool());
    let styles = CatalogRepository::styles(state.pool());

    let mut metrics = DashboardMetrics::default();
    match users.count_customers().await {
        Ok(count) => metrics.customers = count,
        Err(e) => tracing::error!("Failed to count customers: {e}"),
    }
    match categories.count().await {
        Ok(count) => metrics.categories = count,
        Err(e) => tracing::error!("Failed to count categories: {e}"),
    }
    match styles.count().await {
        Ok(count) => metrics.styles = count,
        Err(e) => tracing::error!("Failed to count styles: {e}"),
    }

    let template = DashboardTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/admin/dashboard",
        metrics,
        toast: take_toast(&session).await,
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response()
}
