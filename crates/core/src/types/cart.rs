//! Cart line items and derived totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::Product;

/// A single line in the cart: a product plus a quantity.
///
/// The product fields are flattened into the serialized form, so a persisted
/// cart is an array of product documents each carrying a `quantity` field.
/// The cart holds at most one line per product id; quantity is always >= 1
/// (dropping to zero removes the line instead).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// The product this line refers to.
    #[serde(flatten)]
    pub product: Product,
    /// Units of the product in the cart.
    pub quantity: u32,
}

impl CartLineItem {
    /// Create a new line item.
    #[must_use]
    pub const fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Derived pricing for a cart: subtotal, shipping, tax, and grand total.
///
/// Computed on demand from the current line items; never stored with the
/// cart. The checkout snapshot copies these values into the order record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of `price * quantity` over all lines.
    pub subtotal: Decimal,
    /// Flat-rate shipping, zero for an empty cart.
    pub shipping: Decimal,
    /// Sales tax on the subtotal.
    pub tax: Decimal,
    /// `subtotal + shipping + tax`.
    pub total: Decimal,
}

impl CartTotals {
    /// Totals for an empty cart: all zeros.
    pub const ZERO: Self = Self {
        subtotal: Decimal::ZERO,
        shipping: Decimal::ZERO,
        tax: Decimal::ZERO,
        total: Decimal::ZERO,
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::id::ProductId;
    use crate::types::product::Rating;

    fn product(id: i32, price: Decimal) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price,
            original_price: None,
            description: String::new(),
            category: "test".to_owned(),
            image: "https://example.com/p.jpg".to_owned(),
            images: Vec::new(),
            rating: Rating {
                rate: 4.0,
                count: 1,
            },
            stock: None,
            in_stock: true,
            on_sale: false,
            featured: false,
            brand: None,
            tags: Vec::new(),
            discount: None,
        }
    }

    #[test]
    fn test_line_total() {
        let line = CartLineItem::new(product(1, Decimal::new(1099, 2)), 3);
        assert_eq!(line.line_total(), Decimal::new(3297, 2));
    }

    #[test]
    fn test_serde_flattens_product_fields() {
        let line = CartLineItem::new(product(5, Decimal::new(2500, 2)), 2);
        let value = serde_json::to_value(&line).unwrap();

        // Product fields sit alongside quantity, not nested.
        assert_eq!(value["id"], serde_json::json!(5));
        assert_eq!(value["quantity"], serde_json::json!(2));
        assert!(value.get("product").is_none());

        let back: CartLineItem = serde_json::from_value(value).unwrap();
        assert_eq!(back, line);
    }
}
