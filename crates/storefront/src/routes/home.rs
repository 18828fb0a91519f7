//! Home page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};

use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: CurrentUser,
}

/// Redirect the bare root to wherever the visitor belongs.
///
/// # Route
///
/// `GET /`
pub async fn root(OptionalAuth(user): OptionalAuth) -> Redirect {
    if user.is_some() {
        Redirect::to("/home")
    } else {
        Redirect::to("/login")
    }
}

/// Display the home page for a logged-in user.
///
/// # Route
///
/// `GET /home`
pub async fn home(RequireAuth(user): RequireAuth) -> Response {
    HomeTemplate { user }.into_response()
}
