//! Quantities

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    num::NonZeroU32,
};

use serde::{Deserialize, Serialize};

/// A strictly positive line quantity.
///
/// A cart item can never hold zero or a negative count; requests for those
/// values are turned into removals before they reach the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity from an unsigned count, `None` for zero.
    pub const fn new(count: u32) -> Option<Self> {
        match NonZeroU32::new(count) {
            Some(count) => Some(Self(count)),
            None => None,
        }
    }

    /// Create a quantity from a signed request value, `None` for zero or below.
    ///
    /// Counts above `u32::MAX` saturate, the same as [`Self::saturating_add`].
    pub fn from_signed(count: i64) -> Option<Self> {
        if count <= 0 {
            return None;
        }

        Self::new(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// The count as a plain integer.
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.get()))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.get()
    }
}
