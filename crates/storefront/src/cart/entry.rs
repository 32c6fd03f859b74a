//! Cart line items.

use serde::{Deserialize, Serialize};

use katcakes_core::{CatalogItem, Category, EntryId, Price};

use crate::orders::CustomOrder;

/// A catalog product and how many of it the shopper wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLine {
    pub item: CatalogItem,
    pub quantity: u32,
}

/// One line of the cart.
///
/// Every entry carries a per-unit price; the line total is always the unit
/// price times the quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartEntry {
    Catalog(CatalogLine),
    Custom(CustomOrder),
}

impl CartEntry {
    /// Entry id: the product id for catalog lines, the order id for custom orders.
    #[must_use]
    pub fn id(&self) -> EntryId {
        match self {
            Self::Catalog(line) => EntryId::from(&line.item.id),
            Self::Custom(order) => order.id().clone(),
        }
    }

    #[must_use]
    pub fn is(&self, id: &EntryId) -> bool {
        match self {
            Self::Catalog(line) => line.item.id.as_str() == id.as_str(),
            Self::Custom(order) => order.id() == id,
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Catalog(line) => line.item.name.clone(),
            Self::Custom(order) => order.label(),
        }
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Catalog(line) => line.item.category,
            Self::Custom(order) => order.category(),
        }
    }

    #[must_use]
    pub const fn unit_price(&self) -> Price {
        match self {
            Self::Catalog(line) => line.item.price,
            Self::Custom(order) => order.unit_price(),
        }
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        match self {
            Self::Catalog(line) => line.quantity,
            Self::Custom(order) => order.quantity(),
        }
    }

    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price().times(self.quantity())
    }

    /// Whether the line's price still awaits a manual quote.
    #[must_use]
    pub const fn quote_pending(&self) -> bool {
        match self {
            Self::Catalog(_) => false,
            Self::Custom(order) => order.quote_pending(),
        }
    }
}
