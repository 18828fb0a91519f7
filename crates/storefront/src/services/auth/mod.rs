//! Authentication service.
//!
//! Provides password login, Google sign-in account resolution, and the
//! field validators shared between signup and profile editing.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use marigold_core::{Email, Phone, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;
use crate::services::google::GoogleUserInfo;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Name length bounds.
const MIN_NAME_LENGTH: usize = 2;
const MAX_NAME_LENGTH: usize = 50;

/// Authentication service.
///
/// Handles password login and Google sign-in account resolution.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email and for
    /// a wrong password alike. Returns `AuthError::AccountBlocked` for
    /// blocked accounts (checked before the password so a blocked user
    /// learns why login fails). Returns `AuthError::UseFederatedLogin` for
    /// Google-only accounts.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)
            .map_err(|_| AuthError::Validation("Please enter a valid email address.".to_owned()))?;

        let (user, password_hash) = self
            .users
            .get_auth_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if user.is_blocked {
            return Err(AuthError::AccountBlocked);
        }

        let Some(password_hash) = password_hash else {
            return Err(AuthError::UseFederatedLogin);
        };

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Resolve a Google profile to a local account, creating or linking one
    /// as needed.
    ///
    /// - Known `google_id` → that account.
    /// - Known email without a Google link → link it.
    /// - Known email linked to a *different* Google account →
    ///   `FederatedIdentityConflict`.
    /// - Unknown email → create a passwordless account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountBlocked` if the resolved account is blocked.
    /// Returns `AuthError::FederatedIdentityConflict` on an identity clash.
    pub async fn login_with_google(&self, info: &GoogleUserInfo) -> Result<User, AuthError> {
        if let Some(user) = self.users.get_by_google_id(&info.sub).await? {
            if user.is_blocked {
                return Err(AuthError::AccountBlocked);
            }
            return Ok(user);
        }

        let email = Email::parse(&info.email).map_err(|_| {
            AuthError::Validation("Google returned an invalid email address.".to_owned())
        })?;

        match self.users.get_by_email(&email).await? {
            Some(user) => {
                if user.is_blocked {
                    return Err(AuthError::AccountBlocked);
                }
                // get_by_google_id missed, so a present id is a different account
                if user.google_id.is_some() {
                    return Err(AuthError::FederatedIdentityConflict);
                }
                self.users.link_google(user.id, &info.sub).await?;
                Ok(User {
                    google_id: Some(info.sub.clone()),
                    ..user
                })
            }
            None => {
                let full_name = info
                    .name
                    .clone()
                    .unwrap_or_else(|| email.local_part().to_owned());
                self.users
                    .create_from_google(&full_name, &email, &info.sub, info.picture.as_deref())
                    .await
                    .map_err(|e| match e {
                        RepositoryError::Conflict(_) => AuthError::FederatedIdentityConflict,
                        other => AuthError::Repository(other),
                    })
            }
        }
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }

    /// Update a user's display name and phone number.
    ///
    /// The caller validates the fields first; this only maps the storage
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicatePhone` when another account holds the
    /// number, `AuthError::AccountNotFound` for a vanished user.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        full_name: &str,
        phone: &Phone,
    ) -> Result<(), AuthError> {
        self.users
            .update_profile(user_id, full_name.trim(), phone)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicatePhone,
                RepositoryError::NotFound => AuthError::AccountNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Record the stored path of a new profile image.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` for a vanished user.
    pub async fn set_profile_image(&self, user_id: UserId, path: &str) -> Result<(), AuthError> {
        self.users
            .update_profile_image(user_id, path)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::AccountNotFound,
                other => AuthError::Repository(other),
            })
    }
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validate a customer display name: 2-50 characters, letters and spaces.
///
/// # Errors
///
/// Returns `AuthError::Validation` naming the violated rule.
pub fn validate_full_name(name: &str) -> Result<(), AuthError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < MIN_NAME_LENGTH || trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "Name must be between {MIN_NAME_LENGTH} and {MAX_NAME_LENGTH} characters."
        )));
    }
    if !trimmed.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err(AuthError::Validation(
            "Name may only contain letters and spaces.".to_owned(),
        ));
    }
    Ok(())
}

/// Validate password strength, one message per violated rule.
///
/// # Errors
///
/// Returns `AuthError::Validation` naming the violated rule.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::Validation(
            "Password must contain an uppercase letter.".to_owned(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AuthError::Validation(
            "Password must contain a lowercase letter.".to_owned(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::Validation(
            "Password must contain a digit.".to_owned(),
        ));
    }
    Ok(())
}

/// Parse an email form field into the domain type.
///
/// # Errors
///
/// Returns `AuthError::Validation` with a user-facing message.
pub fn parse_email(email: &str) -> Result<Email, AuthError> {
    Email::parse(email)
        .map_err(|_| AuthError::Validation("Please enter a valid email address.".to_owned()))
}

/// Parse a phone form field into the domain type.
///
/// # Errors
///
/// Returns `AuthError::Validation` with a user-facing message.
pub fn parse_phone(phone: &str) -> Result<Phone, AuthError> {
    Phone::parse(phone).map_err(|_| {
        AuthError::Validation(
            "Please enter a valid 10-digit mobile number starting with 6-9.".to_owned(),
        )
    })
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_full_name_accepts_plain_names() {
        assert!(validate_full_name("Jane Doe").is_ok());
        assert!(validate_full_name("Al").is_ok());
    }

    #[test]
    fn test_validate_full_name_rejects_length() {
        assert!(validate_full_name("J").is_err());
        assert!(validate_full_name(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_full_name_rejects_digits_and_symbols() {
        assert!(validate_full_name("Jane123").is_err());
        assert!(validate_full_name("Jane_Doe").is_err());
    }

    #[test]
    fn test_validate_password_distinct_messages() {
        let short = validate_password("Ab1").unwrap_err();
        assert!(short.to_string().contains("at least 8"));

        let no_upper = validate_password("abcdefg1").unwrap_err();
        assert!(no_upper.to_string().contains("uppercase"));

        let no_lower = validate_password("ABCDEFG1").unwrap_err();
        assert!(no_lower.to_string().contains("lowercase"));

        let no_digit = validate_password("Abcdefgh").unwrap_err();
        assert!(no_digit.to_string().contains("digit"));
    }

    #[test]
    fn test_validate_password_accepts_strong() {
        assert!(validate_password("Secret123").is_ok());
    }

    #[test]
    fn test_hash_and_verify_password_roundtrip() {
        let hash = hash_password("Secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Secret123", &hash).is_ok());
        assert!(matches!(
            verify_password("WrongPass1", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_two_hashes_of_same_password_differ() {
        let first = hash_password("Secret123").unwrap();
        let second = hash_password("Secret123").unwrap();
        assert_ne!(first, second);
    }
}
