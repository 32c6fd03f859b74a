//! Suggested values for the custom-order forms.
//!
//! Flavors and fillings are free-form; these lists only populate the
//! pickers. Toppings are closed enums and come from `katcakes_core`.

use katcakes_core::{CakeSize, CakeTopping, CupcakeTopping, Shape};

/// Preselected values of a fresh form.
pub const DEFAULT_CAKE_FLAVOR: &str = "Baunilha";
pub const DEFAULT_CAKE_FILLING: &str = "Creme de Baunilha";
pub const DEFAULT_CUPCAKE_FLAVOR: &str = "Vanilla";

pub const CAKE_FLAVORS: &[&str] = &[
    DEFAULT_CAKE_FLAVOR,
    "Chocolate",
    "Red Velvet",
    "Limão",
    "Cenoura",
    "Café",
    "Coco",
    "Morango",
    "Laranja",
    "Banana",
];

pub const CAKE_FILLINGS: &[&str] = &[
    DEFAULT_CAKE_FILLING,
    "Ganache de Chocolate",
    "Cream Cheese",
    "Doce de Leite",
    "Creme de Limão",
    "Geléia de Morango",
    "Geléia de Framboesa",
    "Creme de Chocolate",
    "Creme de Café",
];

pub const CUPCAKE_FLAVORS: &[&str] = &[
    DEFAULT_CUPCAKE_FLAVOR,
    "Chocolate",
    "Red Velvet",
    "Lemon",
    "Carrot",
    "Coffee",
    "Coconut",
    "Strawberry",
];

pub const SHAPES: [Shape; 2] = [Shape::Round, Shape::Rectangle];

#[must_use]
pub const fn cake_sizes() -> &'static [CakeSize] {
    &CakeSize::ALL
}

#[must_use]
pub const fn cake_toppings() -> &'static [CakeTopping] {
    &CakeTopping::ALL
}

#[must_use]
pub const fn cupcake_toppings() -> &'static [CupcakeTopping] {
    &CupcakeTopping::ALL
}
