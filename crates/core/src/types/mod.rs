//! Core types for Sneaker Store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod login_code;
pub mod order_number;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use login_code::{LoginCode, LoginCodeError};
pub use order_number::{OrderNumber, OrderNumberError};
pub use price::Price;
pub use status::*;
