//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - One-time login code issuing and verification
//! - `email` - Login code delivery (SMTP or dev log)
//! - `checkout` - Turning session fragments into stored orders
//! - `catalog` - Cached product listings and sample-catalog seeding

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod email;
