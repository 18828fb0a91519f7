//! Integration tests for Marigold.
//!
//! The tests in `tests/` drive a running stack over HTTP; they are all
//! `#[ignore]`d so `cargo test` stays fast and offline.
//!
//! # Running
//!
//! ```bash
//! # Terminal 1: database + servers
//! cargo run -p marigold-cli -- migrate
//! cargo run -p marigold-storefront &
//! cargo run -p marigold-admin &
//!
//! # Terminal 2
//! cargo test -p marigold-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - defaults to `http://localhost:3000`
//! - `ADMIN_BASE_URL` - defaults to `http://localhost:3001`
//! - `ADMIN_TEST_EMAIL` / `ADMIN_TEST_PASSWORD` - credentials of an
//!   existing admin account, required by the admin-panel tests

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin panel (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// HTTP client with a cookie store, following redirects.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// HTTP client with a cookie store that does NOT follow redirects, for
/// asserting on redirect targets directly.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn no_redirect_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Admin credentials from the environment, if configured.
#[must_use]
pub fn admin_credentials() -> Option<(String, String)> {
    let email = std::env::var("ADMIN_TEST_EMAIL").ok()?;
    let password = std::env::var("ADMIN_TEST_PASSWORD").ok()?;
    Some((email, password))
}
