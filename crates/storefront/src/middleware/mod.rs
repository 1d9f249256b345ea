//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Rate limiting (governor, login and code verification only)
//!
//! The session gate itself is an extractor, [`RequireAuth`], rather than a
//! layer, so each protected handler names it in its signature.

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{CurrentShopper, RequireAuth};
pub use rate_limit::login_rate_limiter;
pub use session::create_session_layer;
