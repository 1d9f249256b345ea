//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /                       - Login page
//! POST /                       - Issue a login code, redirect to /verify-otp
//! GET  /verify-otp             - Code entry page (needs a pending email)
//! POST /verify-otp             - Verify the code, redirect to /home
//! GET  /logout                 - Flush the session, redirect to /
//!
//! # Shop (requires auth)
//! GET  /home                   - Featured, trending and all products
//! GET  /address                - Delivery address form
//! POST /address                - Store the address, redirect to /payment
//! GET  /payment                - Payment method form
//! POST /payment                - Store the payment method, redirect to /success
//! GET  /success                - Place the order and show its number
//! GET  /debug-session          - Raw checkout fragments (only when enabled)
//!
//! # Checkout fragments (JSON, always 200)
//! POST /save-cart              - {cart: [...], total}
//! POST /save-address           - address document
//! POST /save-payment           - {payment_method}
//! ```

pub mod auth;
pub mod checkout;
pub mod flash;
pub mod fragments;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Login, code verification and logout.
///
/// Kept separate so `main` can put the login rate limiter on just these.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::login_page).post(auth::login))
        .route("/verify-otp", get(auth::verify_page).post(auth::verify))
}

/// Everything else.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", get(auth::logout))
        .route("/home", get(home::home))
        .route(
            "/address",
            get(checkout::address_page).post(checkout::save_address_form),
        )
        .route(
            "/payment",
            get(checkout::payment_page).post(checkout::save_payment_form),
        )
        .route("/success", get(checkout::success))
        .route("/debug-session", get(checkout::debug_session))
        .route(
            "/save-cart",
            post(fragments::save_cart).fallback(fragments::not_post),
        )
        .route(
            "/save-address",
            post(fragments::save_address).fallback(fragments::not_post),
        )
        .route(
            "/save-payment",
            post(fragments::save_payment).fallback(fragments::not_post),
        )
}

/// Create all routes for the storefront, without rate limiting.
pub fn routes() -> Router<AppState> {
    auth_routes().merge(shop_routes())
}
