//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Phone-number signup, login and session lifecycle

pub mod auth;
