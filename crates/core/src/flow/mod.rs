//! The OTP verification state machine.
//!
//! A session carries at most one [`PendingAction`] at a time. Starting any
//! flow replaces whatever was pending before, which is what makes signup,
//! password reset, and email change mutually exclusive: the union gives the
//! three flows exactly one place to live.
//!
//! Everything here is pure state. Checks take the current time as an
//! argument and touch no I/O, so the whole machine is unit-testable without
//! a server, a database, or a mailbox. Failure is non-consuming by
//! construction: a wrong code returns [`FlowError::InvalidCode`] and leaves
//! the state exactly as it was. Only the caller drops the action, and it
//! does so on [`FlowError::CodeExpired`] and on success.

mod email_change;
mod error;
mod password_reset;
mod signup;

pub use email_change::{EmailChangeProgress, EmailChangeStep, PendingEmailChange};
pub use error::FlowError;
pub use password_reset::PendingPasswordReset;
pub use signup::{PendingSignup, SignupProfile};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Email;

/// How long a verification code stays valid, in minutes.
pub const CODE_TTL_MINUTES: i64 = 5;

/// Expiry timestamp for a code issued at `now`.
fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(CODE_TTL_MINUTES)
}

/// The one in-progress verification flow a session may hold.
///
/// Serialized with serde into the session store; the absent key is the
/// "nothing pending" state, so there is no `None` variant here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    /// A signup awaiting email verification.
    Signup(PendingSignup),
    /// A password reset awaiting verification and a new password.
    PasswordReset(PendingPasswordReset),
    /// An email change walking its three-step flow.
    EmailChange(PendingEmailChange),
}

impl PendingAction {
    /// Short name for logging.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Signup(_) => "signup",
            Self::PasswordReset(_) => "password_reset",
            Self::EmailChange(_) => "email_change",
        }
    }

    /// Replace the active code and restart the validity window, whichever
    /// flow is pending. Returns the address the fresh code must be sent to:
    /// the candidate address when an email change stands at `VerifyNew`,
    /// otherwise the flow's current address.
    pub fn refresh_code(&mut self, code: String, now: DateTime<Utc>) -> Email {
        match self {
            Self::Signup(pending) => pending.refresh(code, now),
            Self::PasswordReset(pending) => pending.refresh(code, now),
            Self::EmailChange(pending) => pending.refresh(code, now),
        }
    }

    /// Seconds until the active code expires, clamped at zero.
    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        let expires_at = match self {
            Self::Signup(pending) => pending.expires_at(),
            Self::PasswordReset(pending) => pending.expires_at(),
            Self::EmailChange(pending) => pending.expires_at(),
        };
        (expires_at - now).num_seconds().max(0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::Phone;

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, minute, second).unwrap()
    }

    fn signup_action() -> PendingAction {
        PendingAction::Signup(PendingSignup::new(
            SignupProfile {
                full_name: "Jane Doe".to_owned(),
                email: Email::parse("jane@x.com").unwrap(),
                phone: Phone::parse("9876543210").unwrap(),
                password: "Secret123".to_owned(),
            },
            "123456".to_owned(),
            at(0, 0),
        ))
    }

    #[test]
    fn test_serde_roundtrip_preserves_the_variant() {
        let action = signup_action();
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.starts_with("{\"signup\":"));

        let restored: PendingAction = serde_json::from_str(&json).unwrap();
        match restored {
            PendingAction::Signup(pending) => {
                assert_eq!(pending.profile().email.as_str(), "jane@x.com");
                assert_eq!(pending.verify("123456", at(1, 0)), Ok(()));
            }
            other => panic!("wrong variant after roundtrip: {}", other.label()),
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(signup_action().label(), "signup");
        let reset = PendingAction::PasswordReset(PendingPasswordReset::new(
            Email::parse("jane@x.com").unwrap(),
            "123456".to_owned(),
            at(0, 0),
        ));
        assert_eq!(reset.label(), "password_reset");
        let change = PendingAction::EmailChange(PendingEmailChange::start(
            Email::parse("jane@x.com").unwrap(),
            "123456".to_owned(),
            at(0, 0),
        ));
        assert_eq!(change.label(), "email_change");
    }

    #[test]
    fn test_refresh_code_returns_the_dispatch_target() {
        let mut action = signup_action();
        let target = action.refresh_code("777777".to_owned(), at(2, 0));
        assert_eq!(target.as_str(), "jane@x.com");
        assert_eq!(action.remaining_seconds(at(2, 0)), 300);
    }

    #[test]
    fn test_remaining_seconds_counts_down_and_clamps() {
        let action = signup_action();
        assert_eq!(action.remaining_seconds(at(0, 0)), 300);
        assert_eq!(action.remaining_seconds(at(4, 30)), 30);
        assert_eq!(action.remaining_seconds(at(12, 0)), 0);
    }
}
