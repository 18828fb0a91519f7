//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::EmailError;

/// Errors that can occur during authentication and verification flows.
///
/// Display strings for the user-facing variants render directly into forms;
/// `PasswordHash`, `Repository`, and `CodeDispatch` are internal and get a
/// generic message at the response boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A form field failed validation; the message names the rule.
    #[error("{0}")]
    Validation(String),

    /// Signup attempted with an email that is already registered.
    #[error("An account with this email already exists.")]
    DuplicateEmail,

    /// Signup attempted with a phone number that is already registered.
    #[error("An account with this phone number already exists.")]
    DuplicatePhone,

    /// Password reset requested for an email with no account.
    #[error("No account found with this email.")]
    AccountNotFound,

    /// Password reset requested for a Google-only account.
    #[error("This account uses Google sign-in and has no password to reset.")]
    FederatedAccountOnly,

    /// Email change requested to an address another account holds.
    #[error("That email is already in use by another account.")]
    EmailTaken,

    /// Wrong password or unknown email. One message for both, so the login
    /// form can't be used to probe which emails are registered.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// The account is blocked by an administrator.
    #[error("Your account has been blocked. Please contact support.")]
    AccountBlocked,

    /// Password login attempted on a Google-only account.
    #[error("This account uses Google sign-in. Please log in with Google.")]
    UseFederatedLogin,

    /// Google sign-in returned an identity that clashes with the identity
    /// already linked to this email.
    #[error("This email is already linked to a different Google account.")]
    FederatedIdentityConflict,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Verification code could not be sent.
    #[error("could not send the verification email: {0}")]
    CodeDispatch(#[from] EmailError),
}
