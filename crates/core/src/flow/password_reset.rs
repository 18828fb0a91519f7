//! Pending password reset state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FlowError, expiry_from};
use crate::types::Email;

/// A password reset awaiting code verification and a new password.
///
/// The reset runs in two stages under one pending entity: the code check
/// flips `verified`, and only a verified, unexpired reset accepts a new
/// password. Verification refreshes the window so the user has the full
/// interval to type the replacement password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPasswordReset {
    email: Email,
    code: String,
    expires_at: DateTime<Utc>,
    verified: bool,
}

impl PendingPasswordReset {
    /// Create an unverified pending reset for `email`.
    #[must_use]
    pub fn new(email: Email, code: String, now: DateTime<Utc>) -> Self {
        Self {
            email,
            code,
            expires_at: expiry_from(now),
            verified: false,
        }
    }

    /// The account the reset targets.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Whether the code check has succeeded.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verified
    }

    /// Check a submitted code; on success mark the reset verified and
    /// restart the validity window.
    ///
    /// A failed check leaves the state untouched.
    ///
    /// # Errors
    ///
    /// [`FlowError::CodeExpired`] past the validity window (checked first),
    /// [`FlowError::InvalidCode`] on mismatch.
    pub fn verify(&mut self, code: &str, now: DateTime<Utc>) -> Result<(), FlowError> {
        if self.is_expired(now) {
            return Err(FlowError::CodeExpired);
        }
        if self.code != code {
            return Err(FlowError::InvalidCode);
        }
        self.verified = true;
        self.expires_at = expiry_from(now);
        Ok(())
    }

    /// Gate for accepting the new password: the reset must be verified and
    /// still inside its window.
    ///
    /// # Errors
    ///
    /// [`FlowError::ResetNotVerified`] if the code was never verified or the
    /// post-verification window has lapsed.
    pub fn ensure_verified(&self, now: DateTime<Utc>) -> Result<(), FlowError> {
        if !self.verified || self.is_expired(now) {
            return Err(FlowError::ResetNotVerified);
        }
        Ok(())
    }

    pub(super) fn refresh(&mut self, code: String, now: DateTime<Utc>) -> Email {
        self.code = code;
        self.expires_at = expiry_from(now);
        self.email.clone()
    }

    pub(super) const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, minute, second).unwrap()
    }

    fn pending() -> PendingPasswordReset {
        PendingPasswordReset::new(
            Email::parse("jane@x.com").unwrap(),
            "123456".to_owned(),
            at(0, 0),
        )
    }

    #[test]
    fn test_new_reset_starts_unverified() {
        let reset = pending();
        assert!(!reset.is_verified());
        assert_eq!(
            reset.ensure_verified(at(0, 30)),
            Err(FlowError::ResetNotVerified)
        );
    }

    #[test]
    fn test_verify_sets_flag_and_extends_window() {
        let mut reset = pending();
        assert_eq!(reset.verify("123456", at(4, 0)), Ok(()));
        assert!(reset.is_verified());
        // Original window closed at 12:05; verification restarted it.
        assert_eq!(reset.ensure_verified(at(8, 0)), Ok(()));
    }

    #[test]
    fn test_wrong_code_leaves_reset_unverified() {
        let mut reset = pending();
        assert_eq!(
            reset.verify("000000", at(1, 0)),
            Err(FlowError::InvalidCode)
        );
        assert!(!reset.is_verified());
        // Retry with the right code still works.
        assert_eq!(reset.verify("123456", at(2, 0)), Ok(()));
    }

    #[test]
    fn test_verify_rejects_expired_code() {
        let mut reset = pending();
        assert_eq!(
            reset.verify("123456", at(6, 0)),
            Err(FlowError::CodeExpired)
        );
        assert!(!reset.is_verified());
    }

    #[test]
    fn test_verified_window_can_lapse_before_completion() {
        let mut reset = pending();
        reset.verify("123456", at(1, 0)).unwrap();
        // Refreshed window ran to 12:06.
        assert_eq!(
            reset.ensure_verified(at(7, 0)),
            Err(FlowError::ResetNotVerified)
        );
    }

    #[test]
    fn test_refresh_issues_new_code_without_touching_verified() {
        let mut reset = pending();
        let target = reset.refresh("654321".to_owned(), at(2, 0));

        assert_eq!(target.as_str(), "jane@x.com");
        assert!(!reset.is_verified());
        assert_eq!(
            reset.verify("123456", at(2, 30)),
            Err(FlowError::InvalidCode)
        );
        assert_eq!(reset.verify("654321", at(3, 0)), Ok(()));
    }
}
