//! McD Calories Core - Menu, cart, and nutrition types.
//!
//! This crate provides the domain model shared by the web server and the CLI:
//! - [`types`] - Validated wrappers for slugs and quantities
//! - [`menu`] - Menu items and listing filters
//! - [`cart`] - The session cart mapping and its mutations
//! - [`nutrition`] - Quantity-weighted totals over a cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. The `sqlite` feature lets a [`Slug`] be bound
//! as a `sqlx` query parameter.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod menu;
pub mod nutrition;
pub mod types;

pub use cart::{Cart, CartError};
pub use menu::{ItemFilter, MenuItem};
pub use nutrition::{CartSummary, Checkout, CheckoutLine, NutritionTotals};
pub use types::*;
