//! User-account views used by the admin panel.
//!
//! Both types read from the shared `users` table. [`AdminAccount`] is the
//! login-time view of a privileged account; [`Customer`] is the listing
//! view shown on the customers screen.

use chrono::{DateTime, Utc};

use marigold_core::{Email, Phone, UserId};

/// A privileged account as seen by the admin login flow.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub id: UserId,
    pub email: Email,
    pub full_name: String,
    /// Present only for accounts that can use the password form.
    pub password_hash: Option<String>,
    /// Present when the account is linked to Google sign-in.
    pub google_id: Option<String>,
    pub is_admin: bool,
    pub is_blocked: bool,
}

/// A customer row on the admin customers screen.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: UserId,
    pub full_name: String,
    pub email: Email,
    pub phone: Option<Phone>,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
}
