//! Session authentication gate.
//!
//! Provides the extractor protected pages use to require a verified login.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use sneaker_store_core::Email;

use crate::models::ShopperSession;

/// Where unauthenticated shoppers are sent.
pub const LOGIN_PATH: &str = "/";

/// The logged-in shopper.
#[derive(Debug, Clone)]
pub struct CurrentShopper {
    /// Email the shopper verified; absent only if the session was tampered with.
    pub email: Option<Email>,
}

/// Extractor that requires a verified login.
///
/// If the session's authenticated flag is not set, the request is redirected
/// to the login page. The gate has no side effects.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(shopper): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {:?}!", shopper.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentShopper);

/// Returned when a protected page is requested without a login.
#[derive(Debug)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        Redirect::to(LOGIN_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(ShopperSession::new)
            .ok_or(AuthRejection)?;

        let authenticated = session.is_authenticated().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read session; treating as logged out");
            false
        });
        if !authenticated {
            return Err(AuthRejection);
        }

        let email = session.authenticated_email().await.ok().flatten();
        Ok(Self(CurrentShopper { email }))
    }
}
