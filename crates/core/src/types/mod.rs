//! Core types for Clementine.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod order;
pub mod order_number;
pub mod product;

pub use cart::{CartLineItem, CartTotals};
pub use id::*;
pub use order::{BillingInfo, OrderRecord};
pub use order_number::{OrderNumber, OrderNumberError};
pub use product::{Product, Rating};
