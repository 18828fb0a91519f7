//! Google OAuth 2.0 client for federated login.
//!
//! # OAuth Flow
//!
//! 1. Generate authorization URL with `authorization_url()`
//! 2. Redirect the visitor to Google's consent page
//! 3. Google redirects back with an authorization code
//! 4. Exchange the code for an access token with `exchange_code()`
//! 5. Fetch the Google profile with `get_user_info()`

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::GoogleOAuthConfig;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Errors from the Google OAuth flow.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Google rejected the request or returned an unexpected payload.
    #[error("OAuth error: {0}")]
    OAuth(String),
}

/// A Google account profile from the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    /// Stable Google account ID.
    pub sub: String,
    /// Email address of the Google account.
    pub email: String,
    /// Display name, when Google provides one.
    pub name: Option<String>,
    /// Profile picture URL, when Google provides one.
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client for Google's OAuth 2.0 endpoints.
#[derive(Clone)]
pub struct GoogleClient {
    inner: Arc<GoogleClientInner>,
}

struct GoogleClientInner {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleClient {
    /// Create a new Google OAuth client.
    ///
    /// The callback lands on `<base_url>/auth/google/callback`; the same
    /// URI must be registered in the Google Cloud console.
    #[must_use]
    pub fn new(config: &GoogleOAuthConfig, base_url: &str) -> Self {
        Self {
            inner: Arc::new(GoogleClientInner {
                client: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
                redirect_uri: format!("{}/auth/google/callback", base_url.trim_end_matches('/')),
            }),
        }
    }

    /// Generate the authorization URL for Google login.
    ///
    /// # Arguments
    ///
    /// * `state` - A random string stored in the session to prevent CSRF attacks
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{AUTHORIZATION_ENDPOINT}?\
            client_id={}&\
            redirect_uri={}&\
            response_type=code&\
            scope=openid%20email%20profile&\
            state={}",
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    pub async fn exchange_code(&self, code: &str) -> Result<String, GoogleError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", &self.inner.redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleError::OAuth(format!("Token exchange failed: {text}")));
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(token_response.access_token)
    }

    /// Fetch the Google profile for an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the userinfo request fails.
    pub async fn get_user_info(&self, access_token: &str) -> Result<GoogleUserInfo, GoogleError> {
        let response = self
            .inner
            .client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleError::OAuth(format!(
                "Userinfo request failed ({status}): {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client() -> GoogleClient {
        GoogleClient::new(
            &GoogleOAuthConfig {
                client_id: "test-client.apps.googleusercontent.com".to_string(),
                client_secret: SecretString::from("v8Kq2mXw4nRj7pLs"),
            },
            "http://localhost:3000/",
        )
    }

    #[test]
    fn test_authorization_url_contains_state_and_redirect() {
        let url = client().authorization_url("abc123");

        assert!(url.starts_with(AUTHORIZATION_ENDPOINT));
        assert!(url.contains("state=abc123"));
        assert!(url.contains(&urlencoding::encode("http://localhost:3000/auth/google/callback").into_owned()));
        assert!(url.contains("scope=openid%20email%20profile"));
    }

    #[test]
    fn test_redirect_uri_strips_trailing_slash() {
        let url = client().authorization_url("s");
        // base_url ends with '/', the callback path must not double it
        assert!(!url.contains(&urlencoding::encode("http://localhost:3000//auth").into_owned()));
    }
}
