//! Clementine Core - Shared types library.
//!
//! This crate provides the domain types used by the Clementine storefront:
//! products, cart line items, pricing totals, and order records.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP, no storage access.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, order numbers, and the product/cart/order models

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
