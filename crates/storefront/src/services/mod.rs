//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Password login, Google account resolution, field validators
//! - `flow` - Orchestration of signup / password reset / email change
//! - `email` - Verification-code delivery over SMTP (or dev-mode logging)
//! - `google` - Google OAuth 2.0 client
//! - `uploads` - Profile image storage

pub mod auth;
pub mod email;
pub mod flow;
pub mod google;
pub mod uploads;
