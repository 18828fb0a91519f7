//! Admin access management.
//!
//! Admins are regular user accounts with `is_admin = TRUE`; these commands
//! flip that flag on an existing account. There is no way to create an
//! account from here: the person signs up through the storefront first.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use sqlx::PgPool;
use thiserror::Error;

use marigold_core::Email;

/// Errors that can occur while managing admin access.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The email did not parse.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No account exists with this email.
    #[error("No account found with email: {0}")]
    NotFound(String),
}

/// Set or clear the `is_admin` flag on the account with this email.
///
/// # Errors
///
/// Returns [`AdminError`] if the email is malformed, the account does not
/// exist, or the database is unreachable.
pub async fn set_admin(email: &str, grant: bool) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let email =
        Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| AdminError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let row = sqlx::query_as::<_, (i32, Option<String>)>(
        r"
        UPDATE users
        SET is_admin = $2, updated_at = NOW()
        WHERE email = $1
        RETURNING id, password_hash
        ",
    )
    .bind(email.as_str())
    .bind(grant)
    .fetch_optional(&pool)
    .await?;

    let Some((id, password_hash)) = row else {
        return Err(AdminError::NotFound(email.to_string()));
    };

    if grant {
        tracing::info!(user_id = id, "Admin access granted to {email}");
        if password_hash.is_none() {
            // The admin login form is password-only.
            tracing::warn!(
                "This account has no password (Google sign-in only) and cannot \
                 use the admin login form until one is set via password reset"
            );
        }
    } else {
        tracing::info!(user_id = id, "Admin access revoked from {email}");
    }

    Ok(())
}
