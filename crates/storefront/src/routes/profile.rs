//! Profile route handlers.
//!
//! View and edit the logged-in user's profile, including the profile
//! image upload. Email changes are not handled here; they go through the
//! verified flow in `routes::auth`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::{CurrentUser, User};
use crate::routes::auth::MessageQuery;
use crate::services::auth::{AuthError, AuthService, parse_phone, validate_full_name};
use crate::services::uploads::UploadService;
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Profile overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/show.html")]
pub struct ProfileTemplate {
    pub user: User,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Profile edit page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/edit.html")]
pub struct EditProfileTemplate {
    pub user: User,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the profile page.
///
/// # Route
///
/// `GET /profile`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;

    Ok(ProfileTemplate {
        user,
        error: query.error,
        success: query.success,
    }
    .into_response())
}

/// Display the profile edit page.
///
/// # Route
///
/// `GET /edit`
pub async fn edit(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;

    Ok(EditProfileTemplate {
        user,
        error: query.error,
    }
    .into_response())
}

fn edit_error(message: &str) -> Response {
    Redirect::to(&format!("/edit?error={}", urlencoding::encode(message))).into_response()
}

/// Handle profile update form submission.
///
/// The form is multipart because of the optional image; the text fields
/// are still required. An empty file part means "keep the current image".
///
/// # Route
///
/// `POST /update`
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    mut multipart: Multipart,
) -> Response {
    let mut full_name: Option<String> = None;
    let mut phone: Option<String> = None;
    let mut image: Option<(String, axum::body::Bytes)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Malformed profile update form: {}", e);
                return edit_error("Invalid form submission.");
            }
        };

        match field.name() {
            Some("full_name") => match field.text().await {
                Ok(value) => full_name = Some(value),
                Err(e) => {
                    tracing::warn!("Failed to read full_name field: {}", e);
                    return edit_error("Invalid form submission.");
                }
            },
            Some("phone") => match field.text().await {
                Ok(value) => phone = Some(value),
                Err(e) => {
                    tracing::warn!("Failed to read phone field: {}", e);
                    return edit_error("Invalid form submission.");
                }
            },
            Some("profile_image") => {
                let content_type = field.content_type().map(ToOwned::to_owned);
                let data = match field.bytes().await {
                    Ok(data) => data,
                    Err(e) => {
                        tracing::warn!("Failed to read image field: {}", e);
                        return edit_error("The image could not be read. It may be too large.");
                    }
                };
                // Browsers send an empty part when no file was picked.
                if !data.is_empty()
                    && let Some(content_type) = content_type
                {
                    image = Some((content_type, data));
                }
            }
            _ => {}
        }
    }

    let (Some(full_name), Some(phone)) = (full_name, phone) else {
        return edit_error("Invalid form submission.");
    };

    if let Err(e) = validate_full_name(&full_name) {
        return edit_error(&e.to_string());
    }
    let phone = match parse_phone(&phone) {
        Ok(phone) => phone,
        Err(e) => return edit_error(&e.to_string()),
    };

    let service = AuthService::new(state.pool());
    match service
        .update_profile(current.id, &full_name, &phone)
        .await
    {
        Ok(()) => {}
        Err(err @ (AuthError::DuplicatePhone | AuthError::AccountNotFound)) => {
            return edit_error(&err.to_string());
        }
        Err(err) => return crate::error::AppError::from(err).into_response(),
    }

    if let Some((content_type, data)) = image {
        let uploads = UploadService::new(&state.config().uploads_dir);
        let path = match uploads
            .store_profile_image(current.id, &content_type, &data)
            .await
        {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(user_id = %current.id, "Profile image rejected: {}", e);
                return edit_error(&e.to_string());
            }
        };
        if let Err(e) = service.set_profile_image(current.id, &path).await {
            tracing::error!("Failed to store profile image path: {}", e);
            return crate::error::AppError::from(e).into_response();
        }
    }

    // Keep the header's display name in sync with the edit.
    let refreshed = CurrentUser {
        id: current.id,
        email: current.email,
        full_name: full_name.trim().to_owned(),
    };
    if let Err(e) = set_current_user(&session, &refreshed).await {
        tracing::error!("Failed to refresh session after profile update: {}", e);
    }

    Redirect::to(&format!(
        "/profile?success={}",
        urlencoding::encode("Profile updated.")
    ))
    .into_response()
}
