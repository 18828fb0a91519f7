//! Errors shared by every verification flow.

use thiserror::Error;

/// Failure modes of the pending-action state machine.
///
/// [`SessionExpired`](Self::SessionExpired) and
/// [`NoActiveSession`](Self::NoActiveSession) describe the empty state and
/// are raised by callers that find nothing pending where a flow requires
/// one; the remaining variants come from the pending types themselves.
///
/// Display strings are user-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlowError {
    /// A flow step was attempted with no pending action in the session.
    #[error("Your verification session has expired. Please start again.")]
    SessionExpired,

    /// The active code's validity window has lapsed.
    #[error("The verification code has expired. Please request a new one.")]
    CodeExpired,

    /// The submitted code does not match the active one.
    #[error("Invalid verification code.")]
    InvalidCode,

    /// A new password was submitted before the reset code was verified.
    #[error("Verify the code sent to your email before setting a new password.")]
    ResetNotVerified,

    /// The operation does not apply to the flow's current step.
    #[error("That step is not available right now.")]
    InvalidStep,

    /// The proposed new email matches the current one.
    #[error("The new email must be different from your current email.")]
    EmailUnchanged,

    /// A resend was requested with nothing pending.
    #[error("No verification in progress.")]
    NoActiveSession,
}
