//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use marigold_core::{Email, Phone, UserId};

/// A customer account (domain type).
///
/// The password hash never lives here; login queries return it alongside
/// the user and drop it as soon as verification is done.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Customer's display name.
    pub full_name: String,
    /// Customer's email address (stored lowercased).
    pub email: Email,
    /// Customer's phone number; `None` for Google-created accounts that
    /// haven't filled in their profile yet.
    pub phone: Option<Phone>,
    /// Google account ID when the account is linked to Google sign-in.
    pub google_id: Option<String>,
    /// Relative path of the uploaded profile image, if any.
    pub profile_image: Option<String>,
    /// Whether this account may use the admin panel.
    pub is_admin: bool,
    /// Whether this account is blocked from logging in.
    pub is_blocked: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account is linked to a Google identity.
    #[must_use]
    pub const fn has_google_link(&self) -> bool {
        self.google_id.is_some()
    }
}
