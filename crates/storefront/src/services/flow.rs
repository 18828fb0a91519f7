//! Orchestration for the verification flows.
//!
//! [`FlowService`] sits between the route handlers and the pure state
//! machine in `marigold_core::flow`: it validates fields, talks to the
//! database, hashes passwords, and dispatches codes. It never touches the
//! session — handlers load the [`PendingAction`], hand it in, and persist
//! (or drop) it depending on the result.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use marigold_core::{
    Email, EmailChangeProgress, FlowError, PendingAction, PendingEmailChange,
    PendingPasswordReset, PendingSignup, SignupProfile, UserId,
};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;
use crate::services::auth::{
    AuthError, hash_password, parse_email, parse_phone, validate_full_name, validate_password,
};
use crate::services::email::{
    EmailError, EmailService, dispatch_verification_code, generate_verification_code,
};

/// Errors from flow orchestration: either a state-machine rule or an
/// auth/validation/storage failure. Transparent so the handlers render the
/// underlying message directly.
#[derive(Debug, Error)]
pub enum FlowServiceError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<RepositoryError> for FlowServiceError {
    fn from(e: RepositoryError) -> Self {
        Self::Auth(AuthError::Repository(e))
    }
}

impl From<EmailError> for FlowServiceError {
    fn from(e: EmailError) -> Self {
        Self::Auth(AuthError::CodeDispatch(e))
    }
}

/// Orchestration service for signup, password reset, and email change.
pub struct FlowService<'a> {
    users: UserRepository<'a>,
    email: Option<&'a EmailService>,
}

impl<'a> FlowService<'a> {
    /// Create a new flow service.
    ///
    /// `email` is `None` in dev mode; codes are then logged instead of sent.
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: Option<&'a EmailService>) -> Self {
        Self {
            users: UserRepository::new(pool),
            email,
        }
    }

    // =========================================================================
    // Signup
    // =========================================================================

    /// Validate a signup form, dispatch a code, and return the pending
    /// signup to store in the session. No user row is written yet.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` per violated field rule,
    /// `DuplicateEmail` / `DuplicatePhone` for taken identifiers.
    pub async fn begin_signup(
        &self,
        full_name: &str,
        email: &str,
        phone: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<PendingAction, FlowServiceError> {
        validate_full_name(full_name)?;
        let email = parse_email(email)?;
        let phone = parse_phone(phone)?;
        validate_password(password)?;

        if self.users.email_exists(&email).await? {
            return Err(AuthError::DuplicateEmail.into());
        }
        if self.users.phone_exists(&phone).await? {
            return Err(AuthError::DuplicatePhone.into());
        }

        let code = generate_verification_code();
        dispatch_verification_code(self.email, &email, &code).await?;

        let profile = SignupProfile {
            full_name: full_name.trim().to_owned(),
            email,
            phone,
            password: password.to_owned(),
        };

        Ok(PendingAction::Signup(PendingSignup::new(profile, code, now)))
    }

    /// Check a signup code and, on success, create the user.
    ///
    /// The email is re-checked against the store right before insert: the
    /// address may have been taken during the verification window, and the
    /// unique index backs the check up under a genuine race.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::CodeExpired` / `InvalidCode` from the code check,
    /// `AuthError::DuplicateEmail` when the address got taken meanwhile.
    pub async fn verify_signup(
        &self,
        pending: &PendingSignup,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<User, FlowServiceError> {
        pending.verify(code, now)?;

        let profile = pending.profile();
        if self.users.email_exists(&profile.email).await? {
            return Err(AuthError::DuplicateEmail.into());
        }

        let password_hash = hash_password(&profile.password)?;

        let user = self
            .users
            .create_from_signup(
                &profile.full_name,
                &profile.email,
                &profile.phone,
                &password_hash,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "Signup verified, account created");
        Ok(user)
    }

    // =========================================================================
    // Password Reset
    // =========================================================================

    /// Start a password reset for an account that owns a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` for an unknown email and
    /// `FederatedAccountOnly` for Google-only accounts.
    pub async fn begin_password_reset(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<PendingAction, FlowServiceError> {
        let email = parse_email(email)?;

        let (_, password_hash) = self
            .users
            .get_auth_by_email(&email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if password_hash.is_none() {
            return Err(AuthError::FederatedAccountOnly.into());
        }

        let code = generate_verification_code();
        dispatch_verification_code(self.email, &email, &code).await?;

        Ok(PendingAction::PasswordReset(PendingPasswordReset::new(
            email, code, now,
        )))
    }

    /// Write a new password for a verified reset.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::ResetNotVerified` unless the code was verified
    /// inside its window, `AuthError::Validation` for a weak password.
    pub async fn complete_password_reset(
        &self,
        pending: &PendingPasswordReset,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), FlowServiceError> {
        pending.ensure_verified(now)?;
        validate_password(new_password)?;

        let password_hash = hash_password(new_password)?;

        self.users
            .update_password(pending.email(), &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::AccountNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(email = %pending.email(), "Password reset completed");
        Ok(())
    }

    // =========================================================================
    // Email Change
    // =========================================================================

    /// Start an email change for the logged-in account, with the first code
    /// sent to the address it holds today.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CodeDispatch` if the code cannot be sent.
    pub async fn begin_email_change(
        &self,
        current_email: &Email,
        now: DateTime<Utc>,
    ) -> Result<PendingAction, FlowServiceError> {
        let code = generate_verification_code();
        dispatch_verification_code(self.email, current_email, &code).await?;

        Ok(PendingAction::EmailChange(PendingEmailChange::start(
            current_email.clone(),
            code,
            now,
        )))
    }

    /// Accept a candidate address at the `EnterNew` step and send a code to
    /// it. Mutates the caller's copy; persist it only on `Ok`.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::InvalidStep` / `CodeExpired` / `EmailUnchanged`
    /// from the state machine, `AuthError::EmailTaken` when another account
    /// holds the address.
    pub async fn submit_new_email(
        &self,
        pending: &mut PendingEmailChange,
        new_email: &str,
        now: DateTime<Utc>,
    ) -> Result<(), FlowServiceError> {
        let new_email = parse_email(new_email)?;

        let code = generate_verification_code();
        pending.submit_new_email(new_email.clone(), code.clone(), now)?;

        if self.users.email_exists(&new_email).await? {
            return Err(AuthError::EmailTaken.into());
        }

        dispatch_verification_code(self.email, &new_email, &code).await?;
        Ok(())
    }

    /// Check a code for whichever email-change step is waiting for one, and
    /// write the new address when the flow completes.
    ///
    /// # Errors
    ///
    /// Returns the state-machine errors from the step check, and
    /// `AuthError::EmailTaken` when the final write loses a race for the
    /// address.
    pub async fn verify_email_change(
        &self,
        user_id: UserId,
        pending: &mut PendingEmailChange,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<EmailChangeProgress, FlowServiceError> {
        let progress = pending.verify_step(code, now)?;

        if let EmailChangeProgress::Complete { new_email } = &progress {
            self.users
                .update_email(user_id, new_email)
                .await
                .map_err(|e| match e {
                    RepositoryError::Conflict(_) => AuthError::EmailTaken,
                    other => AuthError::Repository(other),
                })?;
            tracing::info!(user_id = %user_id, "Email change completed");
        }

        Ok(progress)
    }

    // =========================================================================
    // Resend
    // =========================================================================

    /// Replace the active code, dispatch it to the step-appropriate address,
    /// and return the seconds left on the fresh window.
    ///
    /// Mutates the caller's copy; persist it only on `Ok` so a failed
    /// dispatch leaves the old code valid.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CodeDispatch` if the code cannot be sent.
    pub async fn resend_code(
        &self,
        pending: &mut PendingAction,
        now: DateTime<Utc>,
    ) -> Result<i64, FlowServiceError> {
        let code = generate_verification_code();
        let target = pending.refresh_code(code.clone(), now);

        dispatch_verification_code(self.email, &target, &code).await?;

        tracing::info!(flow = pending.label(), "Verification code resent");
        Ok(pending.remaining_seconds(now))
    }
}
