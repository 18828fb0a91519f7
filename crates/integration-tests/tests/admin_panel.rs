//! Integration tests for the admin panel.
//!
//! These tests require a running admin server, its database, and an
//! existing admin account whose credentials are in the environment:
//!
//! ```bash
//! cargo run -p marigold-cli -- migrate
//! cargo run -p marigold-cli -- admin grant -e admin@example.com
//! ADMIN_TEST_EMAIL=admin@example.com ADMIN_TEST_PASSWORD=... \
//!     cargo test -p marigold-integration-tests -- --ignored
//! ```

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

use marigold_integration_tests::{
    admin_base_url, admin_credentials, client, no_redirect_client,
};

/// Log in and return a client holding the admin session cookie.
async fn logged_in_client() -> Client {
    let (email, password) =
        admin_credentials().expect("ADMIN_TEST_EMAIL and ADMIN_TEST_PASSWORD must be set");

    let client = client();
    let resp = client
        .post(format!("{}/admin", admin_base_url()))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to log in");

    // A successful login lands on the dashboard
    assert!(resp.url().path().contains("/admin/dashboard"));
    client
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_login_page_renders() {
    let resp = client()
        .get(format!("{}/admin", admin_base_url()))
        .send()
        .await
        .expect("Failed to get login page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Admin login"));
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_dashboard_requires_login() {
    let resp = no_redirect_client()
        .get(format!("{}/admin/dashboard", admin_base_url()))
        .send()
        .await
        .expect("Failed to get dashboard");

    assert!(resp.status().is_redirection());
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_api_endpoints_return_json_401_without_session() {
    let resp = client()
        .patch(format!("{}/admin/users/1/toggle-block", admin_base_url()))
        .send()
        .await
        .expect("Failed to call toggle-block");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("JSON body");
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
#[ignore = "Requires running admin server and admin credentials"]
async fn test_dashboard_after_login() {
    let client = logged_in_client().await;

    let resp = client
        .get(format!("{}/admin/dashboard", admin_base_url()))
        .send()
        .await
        .expect("Failed to get dashboard");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Customers"));
    assert!(body.contains("Categories"));
    assert!(body.contains("Styles"));
}

#[tokio::test]
#[ignore = "Requires running admin server and admin credentials"]
async fn test_customers_listing_and_pagination() {
    let client = logged_in_client().await;
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/admin/customers"))
        .send()
        .await
        .expect("Failed to get customers");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("customer(s), page 1"));

    // Search and sort parameters are accepted together
    let resp = client
        .get(format!(
            "{base_url}/admin/customers?page=1&sort=asc&search=example.com"
        ))
        .send()
        .await
        .expect("Failed to search customers");
    assert_eq!(resp.status(), StatusCode::OK);

    // Out-of-range pages clamp instead of erroring
    let resp = client
        .get(format!("{base_url}/admin/customers?page=0"))
        .send()
        .await
        .expect("Failed to get clamped page");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin server and admin credentials"]
async fn test_category_crud_round_trip() {
    let client = logged_in_client().await;
    let base_url = admin_base_url();
    let name = format!("it-category-{}", Uuid::new_v4());

    // Add
    let resp = client
        .post(format!("{base_url}/admin/add-category"))
        .form(&[("name", name.as_str())])
        .send()
        .await
        .expect("Failed to add category");
    assert_eq!(resp.status(), StatusCode::OK);
    let listing = resp.text().await.expect("body");
    assert!(listing.contains(&name));

    // Adding the same name again is a conflict, reported via toast
    let resp = client
        .post(format!("{base_url}/admin/add-category"))
        .form(&[("name", name.as_str())])
        .send()
        .await
        .expect("Failed to re-add category");
    let listing = resp.text().await.expect("body");
    assert!(listing.contains("already exists"));

    // Find the new entry's id by probing the JSON endpoint through the list
    let id = find_entry_id(&listing, &name).expect("new category id in listing");

    // Toggle listing off
    let resp = client
        .patch(format!("{base_url}/admin/toggle-category/{id}"))
        .send()
        .await
        .expect("Failed to toggle category");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("JSON body");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["is_listed"], json!(false));

    // Inline rename via JSON PATCH
    let renamed = format!("{name}-renamed");
    let resp = client
        .patch(format!("{base_url}/admin/category/{id}"))
        .json(&json!({ "name": renamed }))
        .send()
        .await
        .expect("Failed to rename category");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("JSON body");
    assert_eq!(body["name"], json!(renamed));

    // Delete
    let resp = client
        .post(format!("{base_url}/admin/delete-category/{id}"))
        .send()
        .await
        .expect("Failed to delete category");
    assert_eq!(resp.status(), StatusCode::OK);
    let listing = resp.text().await.expect("body");
    assert!(!listing.contains(&renamed));
}

/// Pull the entry id out of the listing markup (`id="entry-{id}"` on the
/// row that contains the name).
fn find_entry_id(listing: &str, name: &str) -> Option<i64> {
    let row_start = listing
        .match_indices("id=\"entry-")
        .map(|(idx, _)| idx)
        .filter(|&idx| {
            listing[idx..]
                .find(name)
                .is_some_and(|offset| offset < 400)
        })
        .last()?;

    let digits: String = listing[row_start + "id=\"entry-".len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
