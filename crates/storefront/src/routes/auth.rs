//! Authentication route handlers.
//!
//! Login, signup with email verification, password reset, email change,
//! and logout. Every multi-step flow keeps its state in the session as a
//! single [`PendingAction`], so starting a new flow abandons the old one.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use marigold_core::{EmailChangeProgress, EmailChangeStep, FlowError, PendingAction};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    OptionalAuth, RequireAuth, clear_current_user, clear_pending_action, load_pending_action,
    set_current_user, store_pending_action,
};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::services::flow::{FlowService, FlowServiceError};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirm: String,
}

/// Verification code form data.
#[derive(Debug, Deserialize)]
pub struct OtpForm {
    pub code: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Reset password form data.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    pub password: String,
    pub password_confirm: String,
}

/// New email address form data.
#[derive(Debug, Deserialize)]
pub struct NewEmailForm {
    pub email: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON body returned by the resend-code endpoint.
#[derive(Debug, Serialize)]
pub struct ResendResponse {
    pub success: bool,
    pub message: String,
    pub remaining_seconds: i64,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
}

/// Verification code entry page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/verify_otp.html")]
pub struct VerifyOtpTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
    pub sent_to: String,
    pub remaining_seconds: i64,
}

/// Forgot password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub error: Option<String>,
}

/// Reset password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub error: Option<String>,
}

/// New email entry page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/email_reset.html")]
pub struct EmailResetTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Redirect Helpers
// =============================================================================

fn redirect_with_error(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{path}?error={}", urlencoding::encode(message))).into_response()
}

fn redirect_with_success(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{path}?success={}", urlencoding::encode(message))).into_response()
}

async fn clear_pending_best_effort(session: &Session) {
    if let Err(e) = clear_pending_action(session).await {
        tracing::error!("Failed to clear pending action: {}", e);
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/home").into_response();
    }

    LoginTemplate {
        error: query.error,
        success: query.success,
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<LoginForm>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/home").into_response();
    }

    let service = AuthService::new(state.pool());
    match service.login(&form.email, &form.password).await {
        Ok(user) => {
            let current = CurrentUser::from(&user);
            set_sentry_user(&current.id, Some(current.email.as_str()));
            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/login?error=session").into_response();
            }
            // A fresh login abandons any half-finished verification flow.
            clear_pending_best_effort(&session).await;
            tracing::info!(user_id = %current.id, "User logged in");
            Redirect::to("/home").into_response()
        }
        Err(
            err @ (AuthError::InvalidCredentials
            | AuthError::AccountBlocked
            | AuthError::UseFederatedLogin),
        ) => redirect_with_error("/login", &err.to_string()),
        Err(err) => AppError::from(err).into_response(),
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/home").into_response();
    }

    SignupTemplate { error: query.error }.into_response()
}

/// Handle signup form submission.
///
/// Nothing is written to the database yet; the validated form travels in
/// the session until the emailed code is confirmed.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<SignupForm>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/home").into_response();
    }

    if form.password != form.password_confirm {
        return redirect_with_error("/signup", "Passwords do not match.");
    }

    let flow = FlowService::new(state.pool(), state.email_service());
    match flow
        .begin_signup(&form.full_name, &form.email, &form.phone, &form.password, Utc::now())
        .await
    {
        Ok(pending) => {
            if let Err(e) = store_pending_action(&session, &pending).await {
                tracing::error!("Failed to store pending signup: {}", e);
                return Redirect::to("/signup?error=session").into_response();
            }
            Redirect::to("/verify-otp").into_response()
        }
        Err(FlowServiceError::Auth(
            err @ (AuthError::Validation(_) | AuthError::DuplicateEmail | AuthError::DuplicatePhone),
        )) => redirect_with_error("/signup", &err.to_string()),
        Err(err) => AppError::from(err).into_response(),
    }
}

// =============================================================================
// Verification Routes
// =============================================================================

/// The address the pending action's current code was sent to.
///
/// During an email change the first code goes to the old address and the
/// second to the new one, so the prompt follows the step.
fn code_target(pending: &PendingAction) -> String {
    match pending {
        PendingAction::Signup(p) => p.profile().email.to_string(),
        PendingAction::PasswordReset(p) => p.email().to_string(),
        PendingAction::EmailChange(p) => {
            if p.step() == EmailChangeStep::VerifyNew {
                p.new_email()
                    .map_or_else(|| p.current_email().to_string(), ToString::to_string)
            } else {
                p.current_email().to_string()
            }
        }
    }
}

/// Display the verification code entry page.
pub async fn verify_otp_page(session: Session, Query(query): Query<MessageQuery>) -> Response {
    let pending = match load_pending_action(&session).await {
        Ok(Some(pending)) => pending,
        Ok(None) => {
            return redirect_with_error("/login", &FlowError::SessionExpired.to_string());
        }
        Err(e) => {
            tracing::error!("Failed to load pending action: {}", e);
            return Redirect::to("/login?error=session").into_response();
        }
    };

    VerifyOtpTemplate {
        error: query.error,
        success: query.success,
        sent_to: code_target(&pending),
        remaining_seconds: pending.remaining_seconds(Utc::now()),
    }
    .into_response()
}

/// Handle verification code submission.
///
/// One endpoint serves all three flows; the stored [`PendingAction`]
/// variant decides what a correct code means.
pub async fn verify_otp(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OtpForm>,
) -> Response {
    let pending = match load_pending_action(&session).await {
        Ok(Some(pending)) => pending,
        // Nothing pending covers both the never-started and the
        // already-completed case, e.g. a retry after a successful verify.
        Ok(None) => {
            return redirect_with_error("/login", &FlowError::SessionExpired.to_string());
        }
        Err(e) => {
            tracing::error!("Failed to load pending action: {}", e);
            return Redirect::to("/login?error=session").into_response();
        }
    };

    let flow = FlowService::new(state.pool(), state.email_service());
    let now = Utc::now();

    match pending {
        PendingAction::Signup(signup) => match flow.verify_signup(&signup, &form.code, now).await {
            Ok(user) => {
                clear_pending_best_effort(&session).await;
                tracing::info!(user_id = %user.id, "Signup verified");
                redirect_with_success("/login", "Account created. You can log in now.")
            }
            Err(FlowServiceError::Flow(err @ FlowError::InvalidCode)) => {
                // The stored action is untouched; the user can retry.
                redirect_with_error("/verify-otp", &err.to_string())
            }
            Err(FlowServiceError::Flow(err @ FlowError::CodeExpired)) => {
                clear_pending_best_effort(&session).await;
                redirect_with_error("/signup", &err.to_string())
            }
            Err(FlowServiceError::Auth(err @ AuthError::DuplicateEmail)) => {
                // Someone registered the address while the code was pending.
                clear_pending_best_effort(&session).await;
                redirect_with_error("/signup", &err.to_string())
            }
            Err(err) => AppError::from(err).into_response(),
        },
        PendingAction::PasswordReset(mut reset) => match reset.verify(&form.code, now) {
            Ok(()) => {
                let updated = PendingAction::PasswordReset(reset);
                if let Err(e) = store_pending_action(&session, &updated).await {
                    tracing::error!("Failed to store verified reset: {}", e);
                    return Redirect::to("/forgot-password?error=session").into_response();
                }
                Redirect::to("/reset-password").into_response()
            }
            Err(err @ FlowError::InvalidCode) => {
                redirect_with_error("/verify-otp", &err.to_string())
            }
            Err(err @ FlowError::CodeExpired) => {
                clear_pending_best_effort(&session).await;
                redirect_with_error("/forgot-password", &err.to_string())
            }
            Err(err) => AppError::Flow(err).into_response(),
        },
        PendingAction::EmailChange(mut change) => {
            let Ok(Some(current)) = session
                .get::<CurrentUser>(crate::models::session::keys::CURRENT_USER)
                .await
            else {
                return Redirect::to("/login").into_response();
            };

            match flow
                .verify_email_change(current.id, &mut change, &form.code, now)
                .await
            {
                Ok(EmailChangeProgress::AwaitingNewEmail) => {
                    let updated = PendingAction::EmailChange(change);
                    if let Err(e) = store_pending_action(&session, &updated).await {
                        tracing::error!("Failed to store email change progress: {}", e);
                        return Redirect::to("/profile?error=session").into_response();
                    }
                    Redirect::to("/email-reset").into_response()
                }
                Ok(EmailChangeProgress::Complete { new_email }) => {
                    clear_pending_best_effort(&session).await;
                    let refreshed = CurrentUser {
                        id: current.id,
                        email: new_email,
                        full_name: current.full_name,
                    };
                    if let Err(e) = set_current_user(&session, &refreshed).await {
                        tracing::error!("Failed to refresh session email: {}", e);
                        return Redirect::to("/login?error=session").into_response();
                    }
                    set_sentry_user(&refreshed.id, Some(refreshed.email.as_str()));
                    redirect_with_success("/profile", "Email address updated.")
                }
                Err(FlowServiceError::Flow(err @ FlowError::InvalidCode)) => {
                    redirect_with_error("/verify-otp", &err.to_string())
                }
                Err(FlowServiceError::Flow(err @ FlowError::CodeExpired)) => {
                    clear_pending_best_effort(&session).await;
                    redirect_with_error("/profile", &err.to_string())
                }
                Err(FlowServiceError::Flow(FlowError::InvalidStep)) => {
                    // Wrong page for the current step; send them to the right one.
                    Redirect::to("/email-reset").into_response()
                }
                Err(FlowServiceError::Auth(err @ AuthError::EmailTaken)) => {
                    clear_pending_best_effort(&session).await;
                    redirect_with_error("/profile", &err.to_string())
                }
                Err(err) => AppError::from(err).into_response(),
            }
        }
    }
}

/// Handle a resend request for the current verification code.
///
/// Called from the verify page over fetch, so failures come back as JSON
/// rather than redirects.
pub async fn resend_otp(State(state): State<AppState>, session: Session) -> Response {
    let mut pending = match load_pending_action(&session).await {
        Ok(Some(pending)) => pending,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ResendResponse {
                    success: false,
                    message: FlowError::NoActiveSession.to_string(),
                    remaining_seconds: 0,
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to load pending action: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ResendResponse {
                    success: false,
                    message: "Something went wrong. Please try again.".to_owned(),
                    remaining_seconds: 0,
                }),
            )
                .into_response();
        }
    };

    let flow = FlowService::new(state.pool(), state.email_service());
    match flow.resend_code(&mut pending, Utc::now()).await {
        Ok(remaining_seconds) => {
            if let Err(e) = store_pending_action(&session, &pending).await {
                tracing::error!("Failed to store refreshed code: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ResendResponse {
                        success: false,
                        message: "Something went wrong. Please try again.".to_owned(),
                        remaining_seconds: 0,
                    }),
                )
                    .into_response();
            }
            Json(ResendResponse {
                success: true,
                message: "Verification code sent.".to_owned(),
                remaining_seconds,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to resend verification code: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ResendResponse {
                    success: false,
                    message: "Could not send the verification code. Please try again.".to_owned(),
                    remaining_seconds: 0,
                }),
            )
                .into_response()
        }
    }
}

// =============================================================================
// Password Reset Routes
// =============================================================================

/// Display the forgot password page.
pub async fn forgot_password_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/home").into_response();
    }

    ForgotPasswordTemplate { error: query.error }.into_response()
}

/// Handle forgot password form submission.
pub async fn forgot_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ForgotPasswordForm>,
) -> Response {
    let flow = FlowService::new(state.pool(), state.email_service());
    match flow.begin_password_reset(&form.email, Utc::now()).await {
        Ok(pending) => {
            if let Err(e) = store_pending_action(&session, &pending).await {
                tracing::error!("Failed to store pending reset: {}", e);
                return Redirect::to("/forgot-password?error=session").into_response();
            }
            Redirect::to("/verify-otp").into_response()
        }
        Err(FlowServiceError::Auth(
            err @ (AuthError::Validation(_)
            | AuthError::AccountNotFound
            | AuthError::FederatedAccountOnly),
        )) => redirect_with_error("/forgot-password", &err.to_string()),
        Err(err) => AppError::from(err).into_response(),
    }
}

/// Display the reset password page.
///
/// Only reachable with a verified reset in the session; anyone else is
/// bounced back to the start of the flow.
pub async fn reset_password_page(session: Session, Query(query): Query<MessageQuery>) -> Response {
    let pending = match load_pending_action(&session).await {
        Ok(Some(PendingAction::PasswordReset(reset))) => reset,
        Ok(_) => return Redirect::to("/forgot-password").into_response(),
        Err(e) => {
            tracing::error!("Failed to load pending action: {}", e);
            return Redirect::to("/forgot-password?error=session").into_response();
        }
    };

    if pending.ensure_verified(Utc::now()).is_err() {
        return Redirect::to("/verify-otp").into_response();
    }

    ResetPasswordTemplate { error: query.error }.into_response()
}

/// Handle reset password form submission.
pub async fn reset_password(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    let pending = match load_pending_action(&session).await {
        Ok(Some(PendingAction::PasswordReset(reset))) => reset,
        Ok(_) => return Redirect::to("/forgot-password").into_response(),
        Err(e) => {
            tracing::error!("Failed to load pending action: {}", e);
            return Redirect::to("/forgot-password?error=session").into_response();
        }
    };

    if form.password != form.password_confirm {
        return redirect_with_error("/reset-password", "Passwords do not match.");
    }

    let flow = FlowService::new(state.pool(), state.email_service());
    match flow
        .complete_password_reset(&pending, &form.password, Utc::now())
        .await
    {
        Ok(()) => {
            clear_pending_best_effort(&session).await;
            redirect_with_success("/login", "Password updated. You can log in now.")
        }
        Err(FlowServiceError::Flow(err @ FlowError::ResetNotVerified)) => {
            clear_pending_best_effort(&session).await;
            redirect_with_error("/forgot-password", &err.to_string())
        }
        Err(FlowServiceError::Auth(err @ AuthError::Validation(_))) => {
            redirect_with_error("/reset-password", &err.to_string())
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

// =============================================================================
// Email Change Routes
// =============================================================================

/// Start the two-code email change.
///
/// Reached from a plain link on the profile page, so it answers GET. The
/// first code goes to the address currently on file.
pub async fn begin_email_change(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Response {
    let flow = FlowService::new(state.pool(), state.email_service());
    match flow.begin_email_change(&user.email, Utc::now()).await {
        Ok(pending) => {
            if let Err(e) = store_pending_action(&session, &pending).await {
                tracing::error!("Failed to store pending email change: {}", e);
                return Redirect::to("/profile?error=session").into_response();
            }
            Redirect::to("/verify-otp").into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

/// Display the new email entry page.
///
/// Sits between the two verification codes; outside that step the user is
/// redirected to wherever the flow actually is.
pub async fn email_reset_page(session: Session, Query(query): Query<MessageQuery>) -> Response {
    let change = match load_pending_action(&session).await {
        Ok(Some(PendingAction::EmailChange(change))) => change,
        Ok(_) => return Redirect::to("/profile").into_response(),
        Err(e) => {
            tracing::error!("Failed to load pending action: {}", e);
            return Redirect::to("/profile?error=session").into_response();
        }
    };

    match change.step() {
        EmailChangeStep::EnterNew => EmailResetTemplate { error: query.error }.into_response(),
        EmailChangeStep::VerifyOld | EmailChangeStep::VerifyNew => {
            Redirect::to("/verify-otp").into_response()
        }
    }
}

/// Handle new email form submission.
pub async fn submit_new_email(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewEmailForm>,
) -> Response {
    let mut change = match load_pending_action(&session).await {
        Ok(Some(PendingAction::EmailChange(change))) => change,
        Ok(_) => return Redirect::to("/profile").into_response(),
        Err(e) => {
            tracing::error!("Failed to load pending action: {}", e);
            return Redirect::to("/profile?error=session").into_response();
        }
    };

    let flow = FlowService::new(state.pool(), state.email_service());
    match flow.submit_new_email(&mut change, &form.email, Utc::now()).await {
        Ok(()) => {
            let updated = PendingAction::EmailChange(change);
            if let Err(e) = store_pending_action(&session, &updated).await {
                tracing::error!("Failed to store pending email change: {}", e);
                return Redirect::to("/profile?error=session").into_response();
            }
            Redirect::to("/verify-otp").into_response()
        }
        Err(FlowServiceError::Flow(err @ FlowError::EmailUnchanged)) => {
            redirect_with_error("/email-reset", &err.to_string())
        }
        Err(FlowServiceError::Flow(FlowError::InvalidStep)) => {
            Redirect::to("/verify-otp").into_response()
        }
        Err(FlowServiceError::Flow(err @ FlowError::CodeExpired)) => {
            // The EnterNew window lapsed; the whole change starts over.
            clear_pending_best_effort(&session).await;
            redirect_with_error("/profile", &err.to_string())
        }
        Err(FlowServiceError::Auth(err @ (AuthError::Validation(_) | AuthError::EmailTaken))) => {
            redirect_with_error("/email-reset", &err.to_string())
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    Redirect::to("/login").into_response()
}
