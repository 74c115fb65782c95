//! Pricing derivation.
//!
//! Pure computation from cart line items to subtotal, shipping, tax, and
//! grand total. All arithmetic is exact decimal; rounding happens only at
//! display time.

use rust_decimal::Decimal;

use clementine_core::{CartLineItem, CartTotals};

/// Flat-rate shipping charged on any non-empty cart.
///
/// TODO: marketing copy advertises free shipping over $50; confirm whether
/// checkout should actually apply that threshold before wiring it in here.
pub const FLAT_RATE_SHIPPING: Decimal = Decimal::from_parts(599, 0, 0, false, 2);

/// Flat sales tax rate (10%), applied to the subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Derive totals from the given line items.
///
/// An empty cart yields all zeros; otherwise `shipping` is the flat rate,
/// `tax` is exactly `TAX_RATE * subtotal`, and `total` is the sum of the
/// three.
#[must_use]
pub fn totals(items: &[CartLineItem]) -> CartTotals {
    let subtotal: Decimal = items.iter().map(CartLineItem::line_total).sum();

    if subtotal == Decimal::ZERO {
        return CartTotals::ZERO;
    }

    let shipping = FLAT_RATE_SHIPPING;
    let tax = subtotal * TAX_RATE;

    CartTotals {
        subtotal,
        shipping,
        tax,
        total: subtotal + shipping + tax,
    }
}
