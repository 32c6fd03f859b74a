//! Pricing rules for custom orders.
//!
//! Pure functions of `(category, size, quantity)`. They are called at every
//! point where a custom order's configuration changes, so a stored price can
//! never drift from the configuration it was derived from.
//!
//! | Category | Unit price                  | Quantity  |
//! |----------|-----------------------------|-----------|
//! | cake     | by size (15cm 2500 … 30cm 5500) | 1..=10 |
//! | cupcake  | 150                         | 6..=100   |
//! | other    | 1000, pending manual quote  | 1..=50    |

use std::ops::RangeInclusive;

use thiserror::Error;

use katcakes_core::{CakeSize, Category, Price};

/// Per-cupcake base price.
pub const CUPCAKE_UNIT_PRICE: Price = Price::new(150);

/// Placeholder assigned to "other" sweets until the bakery quotes them.
pub const QUOTE_PLACEHOLDER: Price = Price::new(1000);

pub const CAKE_QUANTITY: RangeInclusive<u32> = 1..=10;
pub const CUPCAKE_QUANTITY: RangeInclusive<u32> = 6..=100;
pub const OTHER_QUANTITY: RangeInclusive<u32> = 1..=50;

/// Errors from the pricing rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("{category} quantity must be between {min} and {max}, got {got}")]
    QuantityOutOfRange {
        category: Category,
        min: u32,
        max: u32,
        got: u32,
    },

    #[error("a cake needs a size to be priced")]
    MissingSize,
}

/// Price of one cake of the given size.
#[must_use]
pub const fn cake_size_price(size: CakeSize) -> Price {
    match size {
        CakeSize::Cm15 => Price::new(2500),
        CakeSize::Cm18 => Price::new(3000),
        CakeSize::Cm20 => Price::new(3500),
        CakeSize::Cm22 => Price::new(4000),
        CakeSize::Cm30 => Price::new(5500),
    }
}

/// Allowed quantities for a category.
#[must_use]
pub const fn quantity_bounds(category: Category) -> RangeInclusive<u32> {
    match category {
        Category::Cake => CAKE_QUANTITY,
        Category::Cupcake => CUPCAKE_QUANTITY,
        Category::Other => OTHER_QUANTITY,
    }
}

/// Whether a category's price is a placeholder awaiting a manual quote.
#[must_use]
pub const fn is_quote_pending(category: Category) -> bool {
    matches!(category, Category::Other)
}

/// Reject quantities outside the category's bounds. Nothing is clamped.
///
/// # Errors
///
/// Returns `PricingError::QuantityOutOfRange` when `quantity` is outside
/// [`quantity_bounds`].
pub fn check_quantity(category: Category, quantity: u32) -> Result<(), PricingError> {
    let bounds = quantity_bounds(category);
    if bounds.contains(&quantity) {
        Ok(())
    } else {
        Err(PricingError::QuantityOutOfRange {
            category,
            min: *bounds.start(),
            max: *bounds.end(),
            got: quantity,
        })
    }
}

/// Price of a single unit.
///
/// # Errors
///
/// Returns `PricingError::MissingSize` for a cake without a size.
pub const fn unit_price(category: Category, size: Option<CakeSize>) -> Result<Price, PricingError> {
    match category {
        Category::Cake => match size {
            Some(size) => Ok(cake_size_price(size)),
            None => Err(PricingError::MissingSize),
        },
        Category::Cupcake => Ok(CUPCAKE_UNIT_PRICE),
        Category::Other => Ok(QUOTE_PLACEHOLDER),
    }
}

/// Line price: unit price times a validated quantity.
///
/// # Errors
///
/// Returns `PricingError` if the quantity is out of bounds or a cake has no size.
pub fn price(
    category: Category,
    size: Option<CakeSize>,
    quantity: u32,
) -> Result<Price, PricingError> {
    check_quantity(category, quantity)?;
    Ok(unit_price(category, size)?.times(quantity))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cake_price_follows_size_table() {
        for (size, expected) in [
            (CakeSize::Cm15, 2500),
            (CakeSize::Cm18, 3000),
            (CakeSize::Cm20, 3500),
            (CakeSize::Cm22, 4000),
            (CakeSize::Cm30, 5500),
        ] {
            for quantity in CAKE_QUANTITY {
                assert_eq!(
                    price(Category::Cake, Some(size), quantity).unwrap(),
                    Price::new(expected * u64::from(quantity))
                );
            }
        }
    }

    #[test]
    fn test_cupcake_price_over_whole_range() {
        for quantity in CUPCAKE_QUANTITY {
            assert_eq!(
                price(Category::Cupcake, None, quantity).unwrap(),
                Price::new(150 * u64::from(quantity))
            );
        }
    }

    #[test]
    fn test_cupcake_minimum_is_not_clamped() {
        assert_eq!(
            price(Category::Cupcake, None, 5),
            Err(PricingError::QuantityOutOfRange {
                category: Category::Cupcake,
                min: 6,
                max: 100,
                got: 5,
            })
        );
        assert!(price(Category::Cupcake, None, 101).is_err());
    }

    #[test]
    fn test_cake_bounds() {
        assert!(price(Category::Cake, Some(CakeSize::Cm20), 0).is_err());
        assert!(price(Category::Cake, Some(CakeSize::Cm20), 11).is_err());
    }

    #[test]
    fn test_cake_without_size() {
        assert_eq!(
            price(Category::Cake, None, 1),
            Err(PricingError::MissingSize)
        );
    }

    #[test]
    fn test_other_uses_placeholder() {
        assert_eq!(unit_price(Category::Other, None).unwrap(), QUOTE_PLACEHOLDER);
        assert!(is_quote_pending(Category::Other));
        assert!(!is_quote_pending(Category::Cake));
        assert!(check_quantity(Category::Other, 50).is_ok());
        assert!(check_quantity(Category::Other, 51).is_err());
    }
}
