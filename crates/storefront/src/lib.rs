//! Kat Cakes storefront library.
//!
//! The client-side engine of the bakery storefront: catalog lookup, custom
//! order configuration and pricing, the persistent shopping cart and the
//! phone-number session manager. Remote services (accounts, order log, SMS
//! challenges) are reached through the traits in [`backend`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod orders;
pub mod pricing;
pub mod services;
pub mod storage;
pub mod telemetry;
pub mod validation;
