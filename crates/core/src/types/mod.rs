//! Core types for Kat Cakes.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod account;
pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod product;
pub mod status;

pub use account::{Birthday, Gender, UserAccount};
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{PhoneError, PhoneNumber};
pub use price::Price;
pub use product::{
    CakeSize, CakeTopping, CatalogItem, Category, CupcakeTopping, CustomOrderDetails,
    ProductDetails, Shape, Topping,
};
pub use status::OrderStatus;
