//! Kat Cakes Core - Shared types library.
//!
//! This crate provides common types used across all Kat Cakes components:
//! - `storefront` - Cart, pricing, custom orders and phone authentication
//! - `cli` - Command-line tool for inspecting the catalog and driving the cart
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no remote clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, phone numbers, emails,
//!   product attributes and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
