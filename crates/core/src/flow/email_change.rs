//! Pending email change state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FlowError, expiry_from};
use crate::types::Email;

/// Where an email change currently stands.
///
/// The flow walks `VerifyOld -> EnterNew -> VerifyNew` and cannot skip: the
/// old address must be confirmed before a new one is accepted, and the new
/// one must be confirmed before anything is written to the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailChangeStep {
    /// Waiting for the code sent to the current address.
    VerifyOld,
    /// Old address confirmed; waiting for the candidate address.
    EnterNew,
    /// Waiting for the code sent to the candidate address.
    VerifyNew,
}

/// Outcome of a successful [`PendingEmailChange::verify_step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailChangeProgress {
    /// Old address confirmed; prompt the user for the new one.
    AwaitingNewEmail,
    /// New address confirmed; the caller persists it and drops the action.
    Complete {
        /// The verified replacement address.
        new_email: Email,
    },
}

/// An in-progress email change.
///
/// The account's stored email is never touched while this is pending;
/// [`EmailChangeProgress::Complete`] is the only signal to write. Each
/// successful step restarts the validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingEmailChange {
    step: EmailChangeStep,
    current_email: Email,
    new_email: Option<Email>,
    code: String,
    expires_at: DateTime<Utc>,
}

impl PendingEmailChange {
    /// Begin a change for an account currently using `current_email`, with
    /// the first code addressed to that same mailbox.
    #[must_use]
    pub fn start(current_email: Email, code: String, now: DateTime<Utc>) -> Self {
        Self {
            step: EmailChangeStep::VerifyOld,
            current_email,
            new_email: None,
            code,
            expires_at: expiry_from(now),
        }
    }

    /// The current step.
    #[must_use]
    pub const fn step(&self) -> EmailChangeStep {
        self.step
    }

    /// The address the account holds today.
    #[must_use]
    pub const fn current_email(&self) -> &Email {
        &self.current_email
    }

    /// The candidate address, once one has been submitted.
    #[must_use]
    pub const fn new_email(&self) -> Option<&Email> {
        self.new_email.as_ref()
    }

    /// Check a submitted code against the step that is waiting for one.
    ///
    /// At `VerifyOld`, success advances to `EnterNew` with a fresh window.
    /// At `VerifyNew`, success yields [`EmailChangeProgress::Complete`]; the
    /// caller writes the new address and drops the action. A failed check
    /// leaves the state untouched.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidStep`] at `EnterNew` (no code is live there),
    /// [`FlowError::CodeExpired`] past the window,
    /// [`FlowError::InvalidCode`] on mismatch.
    pub fn verify_step(
        &mut self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<EmailChangeProgress, FlowError> {
        match self.step {
            EmailChangeStep::EnterNew => Err(FlowError::InvalidStep),
            EmailChangeStep::VerifyOld => {
                self.check_code(code, now)?;
                self.step = EmailChangeStep::EnterNew;
                self.expires_at = expiry_from(now);
                Ok(EmailChangeProgress::AwaitingNewEmail)
            }
            EmailChangeStep::VerifyNew => {
                self.check_code(code, now)?;
                let Some(new_email) = self.new_email.clone() else {
                    // Unreachable by construction; fail closed.
                    return Err(FlowError::InvalidStep);
                };
                Ok(EmailChangeProgress::Complete { new_email })
            }
        }
    }

    /// Accept the candidate address and arm the final verification with a
    /// fresh code addressed to it.
    ///
    /// # Errors
    ///
    /// [`FlowError::InvalidStep`] unless the flow stands at `EnterNew`,
    /// [`FlowError::CodeExpired`] if the `EnterNew` window lapsed,
    /// [`FlowError::EmailUnchanged`] if `new_email` equals the current
    /// address (case-insensitive, since `Email::parse` normalizes).
    pub fn submit_new_email(
        &mut self,
        new_email: Email,
        code: String,
        now: DateTime<Utc>,
    ) -> Result<(), FlowError> {
        if self.step != EmailChangeStep::EnterNew {
            return Err(FlowError::InvalidStep);
        }
        if self.is_expired(now) {
            return Err(FlowError::CodeExpired);
        }
        if new_email == self.current_email {
            return Err(FlowError::EmailUnchanged);
        }
        self.new_email = Some(new_email);
        self.code = code;
        self.expires_at = expiry_from(now);
        self.step = EmailChangeStep::VerifyNew;
        Ok(())
    }

    pub(super) fn refresh(&mut self, code: String, now: DateTime<Utc>) -> Email {
        self.code = code;
        self.expires_at = expiry_from(now);
        self.dispatch_target().clone()
    }

    pub(super) const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Which mailbox the active code belongs to.
    fn dispatch_target(&self) -> &Email {
        match (self.step, &self.new_email) {
            (EmailChangeStep::VerifyNew, Some(new_email)) => new_email,
            _ => &self.current_email,
        }
    }

    fn check_code(&self, code: &str, now: DateTime<Utc>) -> Result<(), FlowError> {
        if self.is_expired(now) {
            return Err(FlowError::CodeExpired);
        }
        if self.code != code {
            return Err(FlowError::InvalidCode);
        }
        Ok(())
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

    fn current() -> Email {
        Email::parse("jane@x.com").unwrap()
    }

    #[test]
    fn test_start_begins_at_verify_old() {
        let change = PendingEmailChange::start(current(), "111111".to_owned(), at(0, 0));
        assert_eq!(change.step(), EmailChangeStep::VerifyOld);
        assert_eq!(change.new_email(), None);
    }

    #[test]
    fn test_full_walkthrough_reaches_complete() {
        let mut change = PendingEmailChange::start(current(), "111111".to_owned(), at(0, 0));

        let progress = change.verify_step("111111", at(1, 0)).unwrap();
        assert_eq!(progress, EmailChangeProgress::AwaitingNewEmail);
        assert_eq!(change.step(), EmailChangeStep::EnterNew);

        let new = Email::parse("jane.new@x.com").unwrap();
        change
            .submit_new_email(new.clone(), "222222".to_owned(), at(2, 0))
            .unwrap();
        assert_eq!(change.step(), EmailChangeStep::VerifyNew);
        assert_eq!(change.new_email(), Some(&new));

        let progress = change.verify_step("222222", at(3, 0)).unwrap();
        assert_eq!(
            progress,
            EmailChangeProgress::Complete { new_email: new }
        );
    }

    #[test]
    fn test_wrong_code_keeps_the_step() {
        let mut change = PendingEmailChange::start(current(), "111111".to_owned(), at(0, 0));
        assert_eq!(
            change.verify_step("999999", at(1, 0)),
            Err(FlowError::InvalidCode)
        );
        assert_eq!(change.step(), EmailChangeStep::VerifyOld);
        assert!(change.verify_step("111111", at(2, 0)).is_ok());
    }

    #[test]
    fn test_verify_at_enter_new_is_invalid_step() {
        let mut change = PendingEmailChange::start(current(), "111111".to_owned(), at(0, 0));
        change.verify_step("111111", at(1, 0)).unwrap();
        assert_eq!(
            change.verify_step("111111", at(1, 30)),
            Err(FlowError::InvalidStep)
        );
    }

    #[test]
    fn test_submit_before_old_verified_is_invalid_step() {
        let mut change = PendingEmailChange::start(current(), "111111".to_owned(), at(0, 0));
        let new = Email::parse("jane.new@x.com").unwrap();
        assert_eq!(
            change.submit_new_email(new, "222222".to_owned(), at(1, 0)),
            Err(FlowError::InvalidStep)
        );
        assert_eq!(change.step(), EmailChangeStep::VerifyOld);
    }

    #[test]
    fn test_unchanged_email_rejected_case_insensitively() {
        let mut change = PendingEmailChange::start(current(), "111111".to_owned(), at(0, 0));
        change.verify_step("111111", at(1, 0)).unwrap();

        // Email::parse lowercases, so a recased submission is the same address.
        let same = Email::parse("Jane@X.COM").unwrap();
        assert_eq!(
            change.submit_new_email(same, "222222".to_owned(), at(2, 0)),
            Err(FlowError::EmailUnchanged)
        );
        assert_eq!(change.step(), EmailChangeStep::EnterNew);
    }

    #[test]
    fn test_expired_code_reported_at_any_verify_step() {
        let mut change = PendingEmailChange::start(current(), "111111".to_owned(), at(0, 0));
        assert_eq!(
            change.verify_step("111111", at(6, 0)),
            Err(FlowError::CodeExpired)
        );
    }

    #[test]
    fn test_enter_new_window_can_lapse() {
        let mut change = PendingEmailChange::start(current(), "111111".to_owned(), at(0, 0));
        change.verify_step("111111", at(1, 0)).unwrap();
        // EnterNew window runs to 12:06.
        let new = Email::parse("jane.new@x.com").unwrap();
        assert_eq!(
            change.submit_new_email(new, "222222".to_owned(), at(7, 0)),
            Err(FlowError::CodeExpired)
        );
    }

    #[test]
    fn test_old_code_rejected_at_verify_new() {
        let mut change = PendingEmailChange::start(current(), "111111".to_owned(), at(0, 0));
        change.verify_step("111111", at(1, 0)).unwrap();
        let new = Email::parse("jane.new@x.com").unwrap();
        change
            .submit_new_email(new, "222222".to_owned(), at(2, 0))
            .unwrap();

        assert_eq!(
            change.verify_step("111111", at(3, 0)),
            Err(FlowError::InvalidCode)
        );
    }

    #[test]
    fn test_refresh_targets_the_step_appropriate_address() {
        let mut change = PendingEmailChange::start(current(), "111111".to_owned(), at(0, 0));
        assert_eq!(
            change.refresh("333333".to_owned(), at(1, 0)).as_str(),
            "jane@x.com"
        );

        change.verify_step("333333", at(1, 30)).unwrap();
        let new = Email::parse("jane.new@x.com").unwrap();
        change
            .submit_new_email(new, "444444".to_owned(), at(2, 0))
            .unwrap();

        assert_eq!(
            change.refresh("555555".to_owned(), at(3, 0)).as_str(),
            "jane.new@x.com"
        );
    }
}
