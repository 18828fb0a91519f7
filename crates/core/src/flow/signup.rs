//! Pending signup state.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FlowError, expiry_from};
use crate::types::{Email, Phone};

/// Candidate profile captured at signup, held until the email is verified.
///
/// No user row exists while a signup is pending; the whole profile lives in
/// the session. The password stays plaintext until promotion so that hashing
/// happens exactly once, for an account that actually verified. `Debug`
/// redacts it so the value never lands in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct SignupProfile {
    /// Display name, 2-50 letters and spaces.
    pub full_name: String,
    /// Normalized email address.
    pub email: Email,
    /// Ten-digit mobile number.
    pub phone: Phone,
    /// Plaintext password, hashed at promotion.
    pub password: String,
}

impl fmt::Debug for SignupProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupProfile")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A signup awaiting email verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSignup {
    profile: SignupProfile,
    code: String,
    expires_at: DateTime<Utc>,
}

impl PendingSignup {
    /// Create a pending signup with a code valid for the standard window.
    #[must_use]
    pub fn new(profile: SignupProfile, code: String, now: DateTime<Utc>) -> Self {
        Self {
            profile,
            code,
            expires_at: expiry_from(now),
        }
    }

    /// Check a submitted code against the active one.
    ///
    /// Takes `&self`: a failed check never consumes or mutates the pending
    /// signup, so the user can retry until the window closes. Promotion and
    /// cleanup are the caller's job on `Ok`.
    ///
    /// # Errors
    ///
    /// [`FlowError::CodeExpired`] past the validity window (checked first),
    /// [`FlowError::InvalidCode`] on mismatch.
    pub fn verify(&self, code: &str, now: DateTime<Utc>) -> Result<(), FlowError> {
        if self.is_expired(now) {
            return Err(FlowError::CodeExpired);
        }
        if self.code != code {
            return Err(FlowError::InvalidCode);
        }
        Ok(())
    }

    /// The candidate profile.
    #[must_use]
    pub const fn profile(&self) -> &SignupProfile {
        &self.profile
    }

    /// Consume the pending signup, yielding the profile for promotion.
    #[must_use]
    pub fn into_profile(self) -> SignupProfile {
        self.profile
    }

    pub(super) fn refresh(&mut self, code: String, now: DateTime<Utc>) -> Email {
        self.code = code;
        self.expires_at = expiry_from(now);
        self.profile.email.clone()
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
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, minute, second).unwrap()
    }

    fn jane() -> SignupProfile {
        SignupProfile {
            full_name: "Jane Doe".to_owned(),
            email: Email::parse("jane@x.com").unwrap(),
            phone: Phone::parse("9876543210").unwrap(),
            password: "Secret123".to_owned(),
        }
    }

    #[test]
    fn test_verify_accepts_matching_code_within_window() {
        let pending = PendingSignup::new(jane(), "123456".to_owned(), at(0, 0));
        assert_eq!(pending.verify("123456", at(3, 0)), Ok(()));
    }

    #[test]
    fn test_verify_accepts_code_at_exact_expiry() {
        let pending = PendingSignup::new(jane(), "123456".to_owned(), at(0, 0));
        assert_eq!(pending.verify("123456", at(5, 0)), Ok(()));
    }

    #[test]
    fn test_verify_rejects_wrong_code() {
        let pending = PendingSignup::new(jane(), "123456".to_owned(), at(0, 0));
        assert_eq!(
            pending.verify("654321", at(1, 0)),
            Err(FlowError::InvalidCode)
        );
    }

    #[test]
    fn test_wrong_code_does_not_consume_the_pending_signup() {
        let pending = PendingSignup::new(jane(), "123456".to_owned(), at(0, 0));
        assert_eq!(
            pending.verify("000000", at(1, 0)),
            Err(FlowError::InvalidCode)
        );
        // Retry with the right code still succeeds.
        assert_eq!(pending.verify("123456", at(2, 0)), Ok(()));
    }

    #[test]
    fn test_verify_rejects_expired_code() {
        let pending = PendingSignup::new(jane(), "123456".to_owned(), at(0, 0));
        assert_eq!(
            pending.verify("123456", at(5, 1)),
            Err(FlowError::CodeExpired)
        );
    }

    #[test]
    fn test_expiry_reported_before_code_mismatch() {
        let pending = PendingSignup::new(jane(), "123456".to_owned(), at(0, 0));
        assert_eq!(
            pending.verify("999999", at(10, 0)),
            Err(FlowError::CodeExpired)
        );
    }

    #[test]
    fn test_refresh_replaces_code_and_restarts_window() {
        let mut pending = PendingSignup::new(jane(), "111111".to_owned(), at(0, 0));
        let target = pending.refresh("222222".to_owned(), at(4, 0));

        assert_eq!(target.as_str(), "jane@x.com");
        assert_eq!(
            pending.verify("111111", at(4, 30)),
            Err(FlowError::InvalidCode)
        );
        // Old code would have expired at 12:05; refreshed window runs to 12:09.
        assert_eq!(pending.verify("222222", at(8, 0)), Ok(()));
        assert_eq!(pending.expires_at(), at(4, 0) + Duration::minutes(5));
    }

    #[test]
    fn test_into_profile_yields_the_captured_profile() {
        let pending = PendingSignup::new(jane(), "123456".to_owned(), at(0, 0));
        let profile = pending.into_profile();
        assert_eq!(profile.full_name, "Jane Doe");
        assert_eq!(profile.email.as_str(), "jane@x.com");
        assert_eq!(profile.phone.as_str(), "9876543210");
        assert_eq!(profile.password, "Secret123");
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", jane());
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("Secret123"));
    }
}
