//! Address book route handlers.
//!
//! CRUD for a user's delivery addresses. Every query is scoped to the
//! logged-in user; an address ID belonging to someone else behaves exactly
//! like one that doesn't exist.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use marigold_core::{AddressId, AddressLabel};

use crate::db::addresses::AddressRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Address, AddressInput};
use crate::routes::auth::MessageQuery;
use crate::services::auth::{AuthError, parse_phone, validate_full_name};
use crate::state::AppState;

/// Longest accepted street address line.
const MAX_ADDRESS_LINE_LENGTH: usize = 150;

// =============================================================================
// Form Types
// =============================================================================

/// Address form data, shared by create and update.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    pub label: String,
    pub recipient_name: String,
    pub phone: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    /// Checkbox; present only when ticked.
    pub is_default: Option<String>,
}

/// Validate the form and assemble the repository input.
fn validate_address_form(form: &AddressForm) -> std::result::Result<AddressInput, AuthError> {
    let label: AddressLabel = form
        .label
        .parse()
        .map_err(|_| AuthError::Validation("Please choose a valid address label.".to_owned()))?;

    validate_full_name(&form.recipient_name)?;
    let phone = parse_phone(&form.phone)?;

    let address_line = form.address_line.trim();
    if address_line.is_empty() {
        return Err(AuthError::Validation(
            "Please enter the street address.".to_owned(),
        ));
    }
    if address_line.chars().count() > MAX_ADDRESS_LINE_LENGTH {
        return Err(AuthError::Validation(
            "The street address is too long.".to_owned(),
        ));
    }

    let city = form.city.trim();
    if city.is_empty() {
        return Err(AuthError::Validation("Please enter the city.".to_owned()));
    }
    let state = form.state.trim();
    if state.is_empty() {
        return Err(AuthError::Validation("Please enter the state.".to_owned()));
    }

    let pincode = form.pincode.trim();
    if pincode.len() != 6 || !pincode.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::Validation(
            "Pincode must be exactly 6 digits.".to_owned(),
        ));
    }

    Ok(AddressInput {
        label,
        recipient_name: form.recipient_name.trim().to_owned(),
        phone,
        address_line: address_line.to_owned(),
        city: city.to_owned(),
        state: state.to_owned(),
        pincode: pincode.to_owned(),
        is_default: form.is_default.is_some(),
    })
}

// =============================================================================
// Templates
// =============================================================================

/// Address list page template.
#[derive(Template, WebTemplate)]
#[template(path = "address/index.html")]
pub struct AddressIndexTemplate {
    pub addresses: Vec<Address>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Address form page template, shared by add and edit.
#[derive(Template, WebTemplate)]
#[template(path = "address/form.html")]
pub struct AddressFormTemplate {
    /// `Some` when editing, `None` when adding.
    pub address: Option<Address>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the address list.
///
/// # Route
///
/// `GET /address`
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(current.id)
        .await?;

    Ok(AddressIndexTemplate {
        addresses,
        error: query.error,
        success: query.success,
    }
    .into_response())
}

/// Display the new address form.
///
/// # Route
///
/// `GET /address/add`
pub async fn add_page(Query(query): Query<MessageQuery>) -> Response {
    AddressFormTemplate {
        address: None,
        error: query.error,
    }
    .into_response()
}

/// Handle new address form submission.
///
/// # Route
///
/// `POST /address/add`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    axum::Form(form): axum::Form<AddressForm>,
) -> Response {
    let input = match validate_address_form(&form) {
        Ok(input) => input,
        Err(e) => {
            return Redirect::to(&format!(
                "/address/add?error={}",
                urlencoding::encode(&e.to_string())
            ))
            .into_response();
        }
    };

    match AddressRepository::new(state.pool())
        .create(current.id, &input)
        .await
    {
        Ok(address) => {
            tracing::info!(user_id = %current.id, address_id = %address.id, "Address created");
            Redirect::to(&format!(
                "/address?success={}",
                urlencoding::encode("Address added.")
            ))
            .into_response()
        }
        Err(e) => crate::error::AppError::from(e).into_response(),
    }
}

/// Display the edit form for one address.
///
/// # Route
///
/// `GET /address/edit/{id}`
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i32>,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let address = AddressRepository::new(state.pool())
        .get_for_user(AddressId::new(id), current.id)
        .await?;

    let Some(address) = address else {
        return Ok(Redirect::to(&format!(
            "/address?error={}",
            urlencoding::encode("Address not found.")
        ))
        .into_response());
    };

    Ok(AddressFormTemplate {
        address: Some(address),
        error: query.error,
    }
    .into_response())
}

/// Handle address edit form submission.
///
/// # Route
///
/// `POST /address/edit/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i32>,
    axum::Form(form): axum::Form<AddressForm>,
) -> Response {
    let input = match validate_address_form(&form) {
        Ok(input) => input,
        Err(e) => {
            return Redirect::to(&format!(
                "/address/edit/{id}?error={}",
                urlencoding::encode(&e.to_string())
            ))
            .into_response();
        }
    };

    match AddressRepository::new(state.pool())
        .update_for_user(AddressId::new(id), current.id, &input)
        .await
    {
        Ok(()) => Redirect::to(&format!(
            "/address?success={}",
            urlencoding::encode("Address updated.")
        ))
        .into_response(),
        Err(crate::db::RepositoryError::NotFound) => Redirect::to(&format!(
            "/address?error={}",
            urlencoding::encode("Address not found.")
        ))
        .into_response(),
        Err(e) => crate::error::AppError::from(e).into_response(),
    }
}

/// Handle address deletion.
///
/// # Route
///
/// `POST /address/delete/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i32>,
) -> Response {
    match AddressRepository::new(state.pool())
        .delete_for_user(AddressId::new(id), current.id)
        .await
    {
        Ok(true) => Redirect::to(&format!(
            "/address?success={}",
            urlencoding::encode("Address deleted.")
        ))
        .into_response(),
        Ok(false) => Redirect::to(&format!(
            "/address?error={}",
            urlencoding::encode("Address not found.")
        ))
        .into_response(),
        Err(e) => crate::error::AppError::from(e).into_response(),
    }
}
