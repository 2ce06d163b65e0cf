//! Core value types for McD Calories.
//!
//! This module provides validated wrappers for the values that cross the
//! HTTP and session boundaries.

pub mod quantity;
pub mod slug;

pub use quantity::{Quantity, QuantityError};
pub use slug::{Slug, SlugError};
