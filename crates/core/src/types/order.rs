//! Order records produced by checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::CartLineItem;
use super::order_number::OrderNumber;

/// Billing details captured with an order.
///
/// Only address-like fields are retained; card details never leave the
/// payment path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingInfo {
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
}

/// An immutable snapshot of a completed checkout.
///
/// The `items` are a copy of the cart at submission time, independent of any
/// later cart mutations, and the totals are the values the customer was
/// charged. Only the most recent record is retained; writing a new one
/// replaces the previous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Customer-facing order number.
    pub order_number: OrderNumber,
    /// Snapshot of the purchased lines.
    pub items: Vec<CartLineItem>,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    /// When the order completed.
    pub date: DateTime<Utc>,
    pub billing_info: BillingInfo,
}
