//! Admin authentication service.
//!
//! Password login against the shared `users` table, gated on `is_admin`.
//! Unlike the storefront login, failures here are deliberately specific:
//! the form is an internal tool, so "not an admin" and "blocked" read
//! differently to the operator.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use sqlx::PgPool;
use thiserror::Error;

use marigold_core::Email;

use crate::db::{RepositoryError, UserRepository};
use crate::models::AdminAccount;

/// Errors that can occur during admin login.
///
/// Every variant except `Repository` and `PasswordHash` carries a message
/// meant to be rendered into the login form verbatim.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// No account with this email.
    #[error("Admin not found")]
    NotFound,

    /// The account exists but has no admin privileges.
    #[error("This account does not have admin access")]
    NotAnAdmin,

    /// The admin account itself is blocked.
    #[error("This admin account is blocked")]
    Blocked,

    /// Google-only account: no password hash to check against.
    #[error("This account uses Google sign-in and cannot use the password form")]
    PasswordLoginUnavailable,

    /// The password did not match.
    #[error("Invalid password")]
    InvalidPassword,

    /// The stored hash could not be parsed.
    #[error("stored password hash is invalid")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Log an admin in with email and password.
    ///
    /// The checks run in a fixed order so each failure names the first
    /// problem: missing input, bad email, unknown account, missing admin
    /// flag, blocked account, password-less (Google-only) account, wrong
    /// password. A Google-only account is rejected here even though it has
    /// admin privileges; it must not pass the form without a credential
    /// check.
    ///
    /// # Errors
    ///
    /// Returns an [`AdminAuthError`] naming the failed check.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminAccount, AdminAuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AdminAuthError::Validation(
                "Email and password are required".to_owned(),
            ));
        }

        let email = Email::parse(email).map_err(|_| {
            AdminAuthError::Validation("Please enter a valid email address.".to_owned())
        })?;

        let account = self
            .users
            .get_account_by_email(&email)
            .await?
            .ok_or(AdminAuthError::NotFound)?;

        if !account.is_admin {
            return Err(AdminAuthError::NotAnAdmin);
        }

        if account.is_blocked {
            return Err(AdminAuthError::Blocked);
        }

        let Some(hash) = account.password_hash.as_deref() else {
            return Err(AdminAuthError::PasswordLoginUnavailable);
        };

        verify_password(password, hash)?;

        Ok(account)
    }
}

/// Verify a password against an Argon2id hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidPassword)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use argon2::PasswordHasher;
    use argon2::password_hash::{SaltString, rand_core::OsRng};

    fn hash(password: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_verify_password_accepts_match() {
        let stored = hash("Secret123");
        assert!(verify_password("Secret123", &stored).is_ok());
    }

    #[test]
    fn test_verify_password_rejects_mismatch() {
        let stored = hash("Secret123");
        let err = verify_password("wrong", &stored).unwrap_err();
        assert!(matches!(err, AdminAuthError::InvalidPassword));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        let err = verify_password("Secret123", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, AdminAuthError::PasswordHash));
    }

    #[test]
    fn test_error_messages_are_operator_facing() {
        assert_eq!(AdminAuthError::NotFound.to_string(), "Admin not found");
        assert_eq!(
            AdminAuthError::Blocked.to_string(),
            "This admin account is blocked"
        );
        assert_eq!(
            AdminAuthError::InvalidPassword.to_string(),
            "Invalid password"
        );
    }
}
