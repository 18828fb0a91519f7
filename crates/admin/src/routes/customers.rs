//! Customer listing and block-toggle route handlers.

use askama::Template;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use marigold_core::UserId;

use crate::db::users::{BlockToggle, SortOrder};
use crate::db::{RepositoryError, UserRepository};
use crate::filters;
use crate::middleware::{RequireAdminAuth, take_toast};
use crate::models::{Customer, Toast};
use crate::state::AppState;

use super::ApiMessage;
use super::dashboard::AdminUserView;

/// Customers shown per page.
const PER_PAGE: i64 = 10;

/// Query parameters for the customer listing.
#[derive(Debug, Deserialize)]
pub struct CustomersQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

/// Customer view for templates.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub is_blocked: bool,
    pub joined: String,
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.as_i32(),
            name: customer.full_name.clone(),
            email: customer.email.to_string(),
            phone: customer
                .phone
                .as_ref()
                .map_or_else(|| "—".to_string(), ToString::to_string),
            is_blocked: customer.is_blocked,
            joined: customer.created_at.format("%d %b %Y").to_string(),
        }
    }
}

/// Customers list page template.
#[derive(Template)]
#[template(path = "customers/index.html")]
pub struct CustomersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub customers: Vec<CustomerView>,
    pub search: String,
    pub sort: &'static str,
    pub page: i64,
    pub total_pages: i64,
    pub total: i64,
    pub toast: Option<Toast>,
}

/// Customers list page handler.
///
/// # Route
///
/// `GET /admin/customers?page=&search=&sort=`
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CustomersQuery>,
) -> Response {
    let search = query.search.unwrap_or_default().trim().to_string();
    let sort = SortOrder::parse(query.sort.as_deref().unwrap_or_default());
    let page = query.page.unwrap_or(1).max(1);

    let users = UserRepository::new(state.pool());

    let (customers, total) = match users.customer_page(&search, sort, page, PER_PAGE).await {
        Ok(result) => (
            result.customers.iter().map(CustomerView::from).collect(),
            result.total,
        ),
        Err(e) => {
            tracing::error!("Failed to fetch customers: {e}");
            (vec![], 0)
        }
    };

    let total_pages = (total + PER_PAGE - 1) / PER_PAGE;

    let template = CustomersIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/admin/customers",
        customers,
        search,
        sort: sort.as_str(),
        page,
        total_pages,
        total,
        toast: take_toast(&session).await,
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response()
}

/// JSON body returned by a successful block toggle.
#[derive(Debug, Serialize)]
pub struct ToggleBlockResponse {
    pub success: bool,
    pub message: String,
    pub is_blocked: bool,
}

/// Block or unblock a customer account.
///
/// Admin accounts are refused with a 403; the repository enforces the same
/// guard inside the UPDATE, so even a stale listing cannot block an admin.
///
/// # Route
///
/// `PATCH /admin/users/{id}/toggle-block`
#[instrument(skip(admin, state))]
pub async fn toggle_block(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    let users = UserRepository::new(state.pool());

    match users.toggle_block(UserId::new(id)).await {
        Ok(BlockToggle::Toggled { is_blocked }) => {
            tracing::info!(
                admin_id = %admin.id,
                user_id = id,
                is_blocked,
                "Customer block toggled"
            );
            Json(ToggleBlockResponse {
                success: true,
                message: if is_blocked {
                    "Customer blocked".to_string()
                } else {
                    "Customer unblocked".to_string()
                },
                is_blocked,
            })
            .into_response()
        }
        Ok(BlockToggle::AdminAccount) => (
            StatusCode::FORBIDDEN,
            Json(ApiMessage::failure("Admin accounts cannot be blocked")),
        )
            .into_response(),
        Err(RepositoryError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiMessage::failure("Customer not found")),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to toggle block: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiMessage::failure("Something went wrong")),
            )
                .into_response()
        }
    }
}
