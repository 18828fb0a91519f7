//! Category route handlers.
//!
//! Thin wrappers over [`super::catalog`] with the section pinned to
//! categories; the router references these names directly.

use axum::{
    Form, Json,
    extract::{Path, State},
    response::{Redirect, Response},
};
use tower_sessions::Session;

use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

use super::catalog::{self, AddForm, Section, UpdatePayload};

const SECTION: Section = Section::Categories;

/// `GET /admin/categories`
pub async fn index(
    admin: RequireAdminAuth,
    state: State<AppState>,
    session: Session,
) -> Response {
    catalog::index(SECTION, admin, state, session).await
}

/// `POST /admin/add-category`
pub async fn add(
    admin: RequireAdminAuth,
    state: State<AppState>,
    session: Session,
    form: Form<AddForm>,
) -> Redirect {
    catalog::add(SECTION, admin, state, session, form).await
}

/// `POST /admin/delete-category/{id}`
pub async fn delete(
    admin: RequireAdminAuth,
    state: State<AppState>,
    session: Session,
    id: Path<i32>,
) -> Redirect {
    catalog::delete(SECTION, admin, state, session, id).await
}

/// `PATCH /admin/toggle-category/{id}`
pub async fn toggle(
    admin: RequireAdminAuth,
    state: State<AppState>,
    id: Path<i32>,
) -> Response {
    catalog::toggle(SECTION, admin, state, id).await
}

/// `GET /admin/category/{id}`
pub async fn get_json(
    admin: RequireAdminAuth,
    state: State<AppState>,
    id: Path<i32>,
) -> Response {
    catalog::get_json(SECTION, admin, state, id).await
}

/// `PATCH /admin/category/{id}`
pub async fn update_json(
    admin: RequireAdminAuth,
    state: State<AppState>,
    id: Path<i32>,
    payload: Json<UpdatePayload>,
) -> Response {
    catalog::update_json(SECTION, admin, state, id, payload).await
}
