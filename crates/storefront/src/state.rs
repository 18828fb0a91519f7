//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::email::EmailService;
use crate::services::google::GoogleClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    email: Option<EmailService>,
    google: Option<GoogleClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The email service and Google client are built from the optional
    /// sections of the configuration: a missing SMTP block selects dev mode
    /// (verification codes are logged, not sent) and a missing Google block
    /// disables federated login.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be built.
    pub fn new(
        config: StorefrontConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let email = config.email.as_ref().map(EmailService::new).transpose()?;
        let google = config
            .google
            .as_ref()
            .map(|google| GoogleClient::new(google, &config.base_url));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                google,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the email service, or `None` when running in dev mode.
    #[must_use]
    pub fn email_service(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Get the Google OAuth client, or `None` when federated login is disabled.
    #[must_use]
    pub fn google_client(&self) -> Option<&GoogleClient> {
        self.inner.google.as_ref()
    }
}
