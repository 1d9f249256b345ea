//! Authentication route handlers.
//!
//! Email one-time-code login: the shopper enters an email, receives a six
//! digit code, and enters it on the verification page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use sneaker_store_core::{Email, LoginCode};

use super::flash::{self, MessageQuery};
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::models::ShopperSession;
use crate::services::auth::{AuthError, CodeIssuer};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
}

/// Code verification form data.
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    #[serde(default)]
    pub otp: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Code entry page template.
#[derive(Template, WebTemplate)]
#[template(path = "verify_otp.html")]
pub struct VerifyOtpTemplate {
    pub email: String,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

fn redirect_with(path: &str, key: &str, code: &str) -> Response {
    Redirect::to(&format!("{path}?{key}={code}")).into_response()
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error_message(),
        success: query.success_message(),
    }
}

/// Handle login form submission: issue and mail a code.
///
/// A delivery failure re-renders the login page; the code stays stored but
/// the pending email is not recorded, so the shopper must request again.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: ShopperSession,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let Ok(email) = Email::parse(&form.email) else {
        return Ok(redirect_with("/", "error", flash::INVALID_EMAIL));
    };

    let issuer = CodeIssuer::new(state.codes(), state.mailer());
    match issuer.issue(&email).await {
        Ok(_) => {
            session.set_pending_email(&email).await?;
            Ok(redirect_with("/verify-otp", "success", flash::OTP_SENT))
        }
        Err(e) => {
            match &e {
                AuthError::Delivery(_) => {
                    tracing::error!(error = %e, "Failed to send login code");
                }
                _ => {
                    let event_id = sentry::capture_error(&e);
                    tracing::error!(error = %e, sentry_event_id = %event_id, "Failed to issue login code");
                }
            }
            Ok(LoginTemplate {
                error: flash::error_message(flash::OTP_SEND_FAILED),
                success: None,
            }
            .into_response())
        }
    }
}

// =============================================================================
// Verification
// =============================================================================

/// Display the code entry page.
///
/// Without a pending email there is nothing to verify, so the shopper is
/// sent back to the login page.
pub async fn verify_page(
    session: ShopperSession,
    Query(query): Query<MessageQuery>,
) -> Result<Response> {
    let Some(email) = session.pending_email().await? else {
        return Ok(Redirect::to("/").into_response());
    };

    Ok(VerifyOtpTemplate {
        email: email.into_inner(),
        error: query.error_message(),
        success: query.success_message(),
    }
    .into_response())
}

/// Handle code submission.
#[instrument(skip(state, session, form))]
pub async fn verify(
    State(state): State<AppState>,
    session: ShopperSession,
    Form(form): Form<VerifyForm>,
) -> Result<Response> {
    let Some(email) = session.pending_email().await? else {
        return Ok(Redirect::to("/").into_response());
    };

    let invalid = || {
        VerifyOtpTemplate {
            email: email.to_string(),
            error: flash::error_message(flash::INVALID_OTP),
            success: None,
        }
        .into_response()
    };

    // Anything that is not six digits cannot match a stored code.
    let Ok(code) = LoginCode::parse(&form.otp) else {
        return Ok(invalid());
    };

    let issuer = CodeIssuer::new(state.codes(), state.mailer());
    match issuer.verify(&email, &code).await {
        Ok(_) => {
            session.mark_authenticated(&email).await?;
            set_sentry_user(email.as_str());
            tracing::info!(email = %email, "Shopper logged in");
            Ok(redirect_with("/home", "success", flash::LOGGED_IN))
        }
        Err(AuthError::CodeExpired) => Ok(redirect_with("/", "error", flash::OTP_EXPIRED)),
        Err(AuthError::CodeNotFound) => Ok(invalid()),
        Err(AuthError::Repository(e)) => Err(e.into()),
        // Verification never mails.
        Err(e @ AuthError::Delivery(_)) => Err(AppError::Internal(e.to_string())),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Flush the whole session and return to the login page.
pub async fn logout(session: ShopperSession) -> Result<Response> {
    session.flush().await?;
    clear_sentry_user();
    Ok(redirect_with("/", "success", flash::LOGGED_OUT))
}
