//! Product and configuration attributes.
//!
//! Catalog items are fixed products; custom orders carry a category-dependent
//! attribute bag. Both share the same attribute vocabulary.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cake,
    Cupcake,
    /// Custom sweets priced by manual quote.
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 3] = [Self::Cake, Self::Cupcake, Self::Other];

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cake => "cake",
            Self::Cupcake => "cupcake",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cake" => Ok(Self::Cake),
            "cupcake" => Ok(Self::Cupcake),
            "other" => Ok(Self::Other),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// Cake shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Round,
    Rectangle,
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round" => Ok(Self::Round),
            "rectangle" => Ok(Self::Rectangle),
            _ => Err(format!("invalid shape: {s}")),
        }
    }
}

/// Cake diameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum CakeSize {
    #[serde(rename = "15cm")]
    Cm15,
    #[serde(rename = "18cm")]
    Cm18,
    #[default]
    #[serde(rename = "20cm")]
    Cm20,
    #[serde(rename = "22cm")]
    Cm22,
    #[serde(rename = "30cm")]
    Cm30,
}

impl CakeSize {
    /// All sizes, smallest first.
    pub const ALL: [Self; 5] = [Self::Cm15, Self::Cm18, Self::Cm20, Self::Cm22, Self::Cm30];

    /// Label as shown to customers and stored in records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cm15 => "15cm",
            Self::Cm18 => "18cm",
            Self::Cm20 => "20cm",
            Self::Cm22 => "22cm",
            Self::Cm30 => "30cm",
        }
    }
}

impl fmt::Display for CakeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CakeSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| format!("invalid cake size: {s}"))
    }
}

/// Cake covering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CakeTopping {
    Marzipan,
    Ganache,
    #[default]
    Buttercream,
}

impl CakeTopping {
    pub const ALL: [Self; 3] = [Self::Marzipan, Self::Ganache, Self::Buttercream];
}

impl FromStr for CakeTopping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marzipan" => Ok(Self::Marzipan),
            "ganache" => Ok(Self::Ganache),
            "buttercream" => Ok(Self::Buttercream),
            _ => Err(format!("invalid cake topping: {s}")),
        }
    }
}

/// Cupcake frosting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CupcakeTopping {
    #[default]
    #[serde(rename = "Vanilla Buttercream")]
    VanillaButtercream,
    #[serde(rename = "Chocolate Ganache")]
    ChocolateGanache,
    #[serde(rename = "Cream Cheese Frosting")]
    CreamCheeseFrosting,
    #[serde(rename = "Chocolate Buttercream")]
    ChocolateButtercream,
    #[serde(rename = "Whipped Cream")]
    WhippedCream,
    #[serde(rename = "Caramel")]
    Caramel,
}

impl CupcakeTopping {
    pub const ALL: [Self; 6] = [
        Self::VanillaButtercream,
        Self::ChocolateGanache,
        Self::CreamCheeseFrosting,
        Self::ChocolateButtercream,
        Self::WhippedCream,
        Self::Caramel,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VanillaButtercream => "Vanilla Buttercream",
            Self::ChocolateGanache => "Chocolate Ganache",
            Self::CreamCheeseFrosting => "Cream Cheese Frosting",
            Self::ChocolateButtercream => "Chocolate Buttercream",
            Self::WhippedCream => "Whipped Cream",
            Self::Caramel => "Caramel",
        }
    }
}

impl FromStr for CupcakeTopping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("invalid cupcake topping: {s}"))
    }
}

/// A topping from either category's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Topping {
    Cake(CakeTopping),
    Cupcake(CupcakeTopping),
}

/// Fixed attributes of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<CakeSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filling: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topping: Option<Topping>,
}

/// Attribute bag of a custom order. Which fields apply depends on the category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOrderDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<CakeSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filling: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topping: Option<Topping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
}

/// A fixed, pre-defined product. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
    pub category: Category,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ProductDetails>,
}
