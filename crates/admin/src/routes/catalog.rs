//! Shared handlers for the two catalog taxonomy screens.
//!
//! Categories and styles are the same screen with different labels and
//! URLs, so the handlers live here once, parameterized by [`Section`].
//! The `categories` and `styles` modules are thin wrappers that pin the
//! section and re-export the expected handler names.

use askama::Template;
use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_sessions::Session;

use crate::db::catalog::CatalogEntry;
use crate::db::{CatalogRepository, RepositoryError};
use crate::filters;
use crate::middleware::{RequireAdminAuth, set_toast, take_toast};
use crate::models::Toast;
use crate::state::AppState;

use super::ApiMessage;
use super::dashboard::AdminUserView;

/// Longest accepted entry name.
const MAX_NAME_LENGTH: usize = 50;

/// Which taxonomy screen a handler serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Categories,
    Styles,
}

impl Section {
    /// Page heading and nav label.
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Categories => "Categories",
            Self::Styles => "Styles",
        }
    }

    /// Singular noun for messages ("Category added").
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Categories => "Category",
            Self::Styles => "Style",
        }
    }

    /// URL fragment for the per-entry routes (`/admin/delete-category/{id}`).
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Categories => "category",
            Self::Styles => "style",
        }
    }

    /// Path of the listing page, which is also the redirect target after
    /// every mutating form action.
    pub const fn list_path(self) -> &'static str {
        match self {
            Self::Categories => "/admin/categories",
            Self::Styles => "/admin/styles",
        }
    }

    fn repository(self, pool: &PgPool) -> CatalogRepository<'_> {
        match self {
            Self::Categories => CatalogRepository::categories(pool),
            Self::Styles => CatalogRepository::styles(pool),
        }
    }
}

/// Validate a submitted entry name; returns the trimmed name.
fn validate_name(name: &str) -> Result<&str, &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name is required");
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err("Name must be 50 characters or fewer");
    }
    Ok(name)
}

// =============================================================================
// Templates
// =============================================================================

/// Catalog entry view for templates.
#[derive(Debug, Clone)]
pub struct EntryView {
    pub id: i32,
    pub name: String,
    pub is_listed: bool,
    pub created: String,
}

impl From<&CatalogEntry> for EntryView {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name.clone(),
            is_listed: entry.is_listed,
            created: entry.created_at.format("%d %b %Y").to_string(),
        }
    }
}

/// Shared listing page template for both sections.
#[derive(Template)]
#[template(path = "catalog/index.html")]
pub struct CatalogIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub heading: &'static str,
    pub singular: &'static str,
    pub slug: &'static str,
    pub list_path: &'static str,
    pub add_path: String,
    pub entries: Vec<EntryView>,
    pub toast: Option<Toast>,
}

// =============================================================================
// Form / JSON payloads
// =============================================================================

/// Add-entry form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub name: String,
}

/// Inline-edit JSON payload; absent fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdatePayload {
    pub name: Option<String>,
    pub is_listed: Option<bool>,
}

/// JSON shape for a single entry (inline-edit fetch and update).
#[derive(Debug, Serialize)]
pub struct EntryPayload {
    pub success: bool,
    pub id: i32,
    pub name: String,
    pub is_listed: bool,
}

impl From<&CatalogEntry> for EntryPayload {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            success: true,
            id: entry.id,
            name: entry.name.clone(),
            is_listed: entry.is_listed,
        }
    }
}

/// JSON body returned by a successful listing toggle.
#[derive(Debug, Serialize)]
pub struct TogglePayload {
    pub success: bool,
    pub is_listed: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Listing page: every entry newest first, plus the add form.
pub async fn index(
    section: Section,
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Response {
    let repo = section.repository(state.pool());

    let entries = match repo.list_all().await {
        Ok(entries) => entries.iter().map(EntryView::from).collect(),
        Err(e) => {
            tracing::error!("Failed to list {}: {e}", section.heading());
            vec![]
        }
    };

    let template = CatalogIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: section.list_path(),
        heading: section.heading(),
        singular: section.singular(),
        slug: section.slug(),
        list_path: section.list_path(),
        add_path: format!("/admin/add-{}", section.slug()),
        entries,
        toast: take_toast(&session).await,
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response()
}

/// Add a new entry from the listing-page form.
pub async fn add(
    section: Section,
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddForm>,
) -> Redirect {
    let toast = match validate_name(&form.name) {
        Ok(name) => {
            let repo = section.repository(state.pool());
            match repo.insert(name, true, admin.id).await {
                Ok(entry) => {
                    tracing::info!(admin_id = %admin.id, name = %entry.name, "{} added", section.singular());
                    Toast::success(format!("{} added", section.singular()))
                }
                Err(RepositoryError::Conflict(_)) => {
                    Toast::error(format!("A {} with this name already exists", section.slug()))
                }
                Err(e) => {
                    tracing::error!("Failed to add {}: {e}", section.slug());
                    Toast::error("Something went wrong. Please try again.")
                }
            }
        }
        Err(message) => Toast::error(message),
    };

    if let Err(e) = set_toast(&session, &toast).await {
        tracing::error!("Failed to store toast: {}", e);
    }

    Redirect::to(section.list_path())
}

/// Hard-delete an entry.
pub async fn delete(
    section: Section,
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Redirect {
    let repo = section.repository(state.pool());

    let toast = match repo.delete(id).await {
        Ok(true) => {
            tracing::info!(admin_id = %admin.id, id, "{} deleted", section.singular());
            Toast::success(format!("{} deleted", section.singular()))
        }
        Ok(false) => Toast::error(format!("{} not found", section.singular())),
        Err(e) => {
            tracing::error!("Failed to delete {}: {e}", section.slug());
            Toast::error("Something went wrong. Please try again.")
        }
    };

    if let Err(e) = set_toast(&session, &toast).await {
        tracing::error!("Failed to store toast: {}", e);
    }

    Redirect::to(section.list_path())
}

/// Flip the listed flag (JSON).
pub async fn toggle(
    section: Section,
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    let repo = section.repository(state.pool());

    match repo.toggle_listing(id).await {
        Ok(Some(is_listed)) => Json(TogglePayload {
            success: true,
            is_listed,
        })
        .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiMessage::failure(format!(
                "{} not found",
                section.singular()
            ))),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to toggle {}: {e}", section.slug());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiMessage::failure("Something went wrong")),
            )
                .into_response()
        }
    }
}

/// Fetch one entry for the inline-edit form (JSON).
pub async fn get_json(
    section: Section,
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    let repo = section.repository(state.pool());

    match repo.get(id).await {
        Ok(Some(entry)) => Json(EntryPayload::from(&entry)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiMessage::failure(format!(
                "{} not found",
                section.singular()
            ))),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to fetch {}: {e}", section.slug());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiMessage::failure("Something went wrong")),
            )
                .into_response()
        }
    }
}

/// Apply an inline edit (JSON).
pub async fn update_json(
    section: Section,
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePayload>,
) -> Response {
    let name = match payload.name.as_deref().map(validate_name).transpose() {
        Ok(name) => name,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(ApiMessage::failure(message)))
                .into_response();
        }
    };

    if name.is_none() && payload.is_listed.is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiMessage::failure("Nothing to update")),
        )
            .into_response();
    }

    let repo = section.repository(state.pool());

    match repo.update(id, name, payload.is_listed).await {
        Ok(Some(entry)) => {
            tracing::info!(admin_id = %admin.id, id, "{} updated", section.singular());
            Json(EntryPayload::from(&entry)).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiMessage::failure(format!(
                "{} not found",
                section.singular()
            ))),
        )
            .into_response(),
        Err(RepositoryError::Conflict(_)) => (
            StatusCode::CONFLICT,
            Json(ApiMessage::failure(format!(
                "A {} with this name already exists",
                section.slug()
            ))),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to update {}: {e}", section.slug());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiMessage::failure("Something went wrong")),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("  Shirts  "), Ok("Shirts"));
    }

    #[test]
    fn test_validate_name_rejects_empty() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("").is_err());
    }

    #[test]
    fn test_validate_name_rejects_overlong() {
        let long = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(validate_name(&long).is_err());
        let just_fits = "a".repeat(MAX_NAME_LENGTH);
        assert!(validate_name(&just_fits).is_ok());
    }

    #[test]
    fn test_section_paths() {
        assert_eq!(Section::Categories.list_path(), "/admin/categories");
        assert_eq!(Section::Styles.slug(), "style");
    }
}
