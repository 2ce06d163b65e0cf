//! Cart quantity type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The input is not a base-10 integer.
    #[error("quantity must be a whole number (got {0:?})")]
    NotAnInteger(String),
    /// The input is zero or negative.
    #[error("quantity must be at least 1")]
    NotPositive,
    /// The input does not fit in a `u32`.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Maximum allowed quantity.
        max: u32,
    },
}

/// A positive number of units of one menu item.
///
/// Zero is not representable: a cart entry that would drop to zero is
/// removed instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        if value == 0 { None } else { Some(Self(value)) }
    }

    /// Parse a quantity submitted as form text.
    ///
    /// Surrounding whitespace is ignored. Anything else that is not a
    /// positive base-10 integer is rejected rather than coerced.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError`] for non-integers, values below 1, and values
    /// above `u32::MAX`.
    pub fn parse(s: &str) -> Result<Self, QuantityError> {
        let trimmed = s.trim();
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| QuantityError::NotAnInteger(trimmed.to_owned()))?;

        if value < 1 {
            return Err(QuantityError::NotPositive);
        }

        u32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge { max: u32::MAX })
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add two quantities, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(QuantityError::NotPositive)
    }
}

impl From<Quantity> for u32 {
    fn from(qty: Quantity) -> Self {
        qty.0
    }
}
