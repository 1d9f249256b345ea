//! Sneaker Store Core - Shared types library.
//!
//! This crate provides common types used across all Sneaker Store components:
//! - `storefront` - Shopper-facing site (login, catalog, checkout)
//! - `cli` - Command-line tools for migrations, seeding, and order lookup
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, order numbers,
//!   login codes, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
