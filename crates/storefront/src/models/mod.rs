//! Domain models for the storefront.
//!
//! - [`code`] - One-time login codes
//! - [`product`] - Catalog products
//! - [`checkout`] - Cart and delivery-address fragments as shoppers submit them
//! - [`order`] - Placed orders and their line items
//! - [`session`] - Typed access to per-shopper session state

pub mod checkout;
pub mod code;
pub mod order;
pub mod product;
pub mod session;

pub use checkout::{CartLine, CheckoutFragments, DeliveryAddress};
pub use code::OneTimeCode;
pub use order::{NewOrder, NewOrderItem, Order, OrderItem, OrderSummary};
pub use product::{NewProduct, Product, ProductFilter};
pub use session::{ShopperSession, session_keys};
