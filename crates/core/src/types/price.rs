//! Integer price representation.
//!
//! The storefront sells in a single currency (Mozambican metical), so a price
//! is just a count of minor units. Arithmetic saturates instead of wrapping:
//! a cart total can never overflow into a small number.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// A non-negative amount of money in minor currency units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Currency suffix used when displaying prices.
    pub const CURRENCY_SUFFIX: &'static str = "MT";

    /// Create a price from a count of minor units.
    #[must_use]
    pub const fn new(minor_units: u64) -> Self {
        Self(minor_units)
    }

    /// The amount in minor units.
    #[must_use]
    pub const fn minor_units(self) -> u64 {
        self.0
    }

    /// Multiply a unit price by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, Self::CURRENCY_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times() {
        assert_eq!(Price::new(150).times(6), Price::new(900));
        assert_eq!(Price::new(2500).times(0), Price::ZERO);
    }

    #[test]
    fn test_times_saturates() {
        assert_eq!(Price::new(u64::MAX).times(2), Price::new(u64::MAX));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::new(2500), Price::new(900)].into_iter().sum();
        assert_eq!(total, Price::new(3400));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::new(3500).to_string(), "3500 MT");
    }
}
