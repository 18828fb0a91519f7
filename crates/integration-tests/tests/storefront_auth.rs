//! Integration tests for the storefront auth surface.
//!
//! These tests require a running storefront server and its database:
//!
//! ```bash
//! cargo run -p marigold-cli -- migrate
//! cargo run -p marigold-storefront
//! ```
//!
//! Run with: `cargo test -p marigold-integration-tests -- --ignored`

use reqwest::StatusCode;
use uuid::Uuid;

use marigold_integration_tests::{client, no_redirect_client, storefront_base_url};

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", storefront_base_url()))
        .send()
        .await
        .expect("Failed to reach storefront");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_signup_page_renders() {
    let resp = client()
        .get(format!("{}/signup", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get signup page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("form"));
    assert!(body.contains("password"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_signup_rejects_weak_password() {
    let base_url = storefront_base_url();
    let email = format!("it-{}@example.com", Uuid::new_v4());

    let resp = no_redirect_client()
        .post(format!("{base_url}/signup"))
        .form(&[
            ("full_name", "Test Person"),
            ("email", email.as_str()),
            ("phone", "9876543210"),
            ("password", "short"),
            ("password_confirm", "short"),
        ])
        .send()
        .await
        .expect("Failed to post signup");

    // Validation failures bounce back to the signup form with an error
    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(location.starts_with("/signup"), "location was {location}");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_signup_sends_to_verify_otp() {
    let base_url = storefront_base_url();
    let email = format!("it-{}@example.com", Uuid::new_v4());
    // Phone must be unique too; derive ten digits starting with 9
    let phone = format!("9{:09}", rand_digits());

    let resp = no_redirect_client()
        .post(format!("{base_url}/signup"))
        .form(&[
            ("full_name", "Test Person"),
            ("email", email.as_str()),
            ("phone", phone.as_str()),
            ("password", "Secret123"),
            ("password_confirm", "Secret123"),
        ])
        .send()
        .await
        .expect("Failed to post signup");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        location.starts_with("/verify-otp"),
        "location was {location}"
    );
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_login_rejects_unknown_account() {
    let base_url = storefront_base_url();

    let resp = no_redirect_client()
        .post(format!("{base_url}/login"))
        .form(&[
            ("email", "nobody@example.com"),
            ("password", "Whatever123"),
        ])
        .send()
        .await
        .expect("Failed to post login");

    // Unknown email and wrong password are indistinguishable
    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(location.starts_with("/login"), "location was {location}");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_verify_without_pending_action_reports_expired_session() {
    let base_url = storefront_base_url();

    // Fresh cookie jar, so the session has nothing pending
    let resp = no_redirect_client()
        .post(format!("{base_url}/verify-otp"))
        .form(&[("code", "123456")])
        .send()
        .await
        .expect("Failed to post verification code");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(location.starts_with("/login"), "location was {location}");
    assert!(location.contains("expired"), "location was {location}");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_protected_pages_redirect_guests() {
    let base_url = storefront_base_url();

    for path in ["/home", "/profile", "/address", "/reset-email"] {
        let resp = no_redirect_client()
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to get protected page");

        assert!(
            resp.status().is_redirection(),
            "{path} returned {}",
            resp.status()
        );
    }
}

/// Nine pseudo-random digits derived from a UUID, for unique phone numbers.
fn rand_digits() -> u32 {
    let uuid = Uuid::new_v4();
    let bytes = uuid.as_bytes();
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) % 1_000_000_000
}
