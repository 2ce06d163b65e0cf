//! Session-related types.

/// Session keys.
pub mod keys {
    /// Key for the visitor's cart (`mcd_calories_core::Cart`, JSON object of slug to quantity).
    pub const CART: &str = "cart";
}
