//! Product catalog record.
//!
//! The catalog file is the single source of these records; they are
//! validated once at load time and never mutated afterwards. The JSON field
//! names are camelCase, matching the persisted cart/order documents.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product in the catalog.
///
/// ## Field defaults
///
/// Optional fields deserialize with explicit defaults rather than being
/// checked at every read site:
///
/// - `description` - empty string
/// - `originalPrice`, `stock`, `brand`, `discount` - absent
/// - `inStock` - `true`
/// - `onSale`, `featured` - `false`
/// - `images`, `tags` - empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price in USD.
    pub price: Decimal,
    /// Pre-discount price, shown struck through when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    /// Longer-form description for the detail page.
    #[serde(default)]
    pub description: String,
    /// Category name (e.g. "kitchen").
    pub category: String,
    /// Primary image URL.
    pub image: String,
    /// Additional image URLs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Aggregate customer rating.
    pub rating: Rating,
    /// Units on hand, when tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    /// Whether the product can currently be purchased.
    #[serde(default = "default_true")]
    pub in_stock: bool,
    /// Whether the product is currently on sale.
    #[serde(default)]
    pub on_sale: bool,
    /// Whether the product is featured on the home page.
    #[serde(default)]
    pub featured: bool,
    /// Brand name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Search/browse tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Discount percentage, when advertised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
}

/// Aggregate customer rating for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating, 0 to 5.
    pub rate: f64,
    /// Number of ratings contributing to the average.
    pub count: u32,
}

const fn default_true() -> bool {
    true
}
