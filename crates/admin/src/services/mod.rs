//! Business logic services for the admin panel.
//!
//! # Services
//!
//! - `auth` - password login for admin accounts

pub mod auth;

pub use auth::{AdminAuthError, AdminAuthService};
