//! Product catalog loaded at startup.
//!
//! The catalog is an immutable, in-memory list of products read from a
//! versioned JSON file. All validation happens here, once, at load time:
//! route handlers and services can rely on ids being unique, prices being
//! non-negative, ratings being in range, and image URLs parsing.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use thiserror::Error;

use clementine_core::{Product, ProductId};

/// Catalog file schema version this build understands.
const SUPPORTED_VERSION: u32 = 1;

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not valid JSON for the expected schema.
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The file declares a schema version this build does not understand.
    #[error("unsupported catalog schema version {found} (expected {SUPPORTED_VERSION})")]
    UnsupportedVersion { found: u32 },

    /// Two products share an id.
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),

    /// A product has a negative price.
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),

    /// A product rating is outside 0-5.
    #[error("product {0} has a rating outside 0-5")]
    RatingOutOfRange(ProductId),

    /// A product image URL does not parse.
    #[error("product {id} has an invalid image URL: {source}")]
    InvalidImageUrl {
        id: ProductId,
        source: url::ParseError,
    },
}

/// On-disk catalog file shape.
#[derive(Debug, serde::Deserialize)]
struct CatalogFile {
    version: u32,
    products: Vec<Product>,
}

/// Immutable product catalog.
///
/// Constructed once at startup and shared through `AppState` for the
/// process lifetime.
#[derive(Debug)]
pub struct Catalog {
    products: Vec<Product>,
    by_id: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Load and validate the catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse and validate a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON does not match the schema or fails
    /// validation.
    pub fn from_json(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(contents)?;

        if file.version != SUPPORTED_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                found: file.version,
            });
        }

        let mut by_id = HashMap::with_capacity(file.products.len());
        for (index, product) in file.products.iter().enumerate() {
            if by_id.insert(product.id, index).is_some() {
                return Err(CatalogError::DuplicateId(product.id));
            }
            if product.price < Decimal::ZERO {
                return Err(CatalogError::NegativePrice(product.id));
            }
            if !(0.0..=5.0).contains(&product.rating.rate) {
                return Err(CatalogError::RatingOutOfRange(product.id));
            }
            url::Url::parse(&product.image).map_err(|source| CatalogError::InvalidImageUrl {
                id: product.id,
                source,
            })?;
        }

        tracing::info!(products = file.products.len(), "catalog loaded");

        Ok(Self {
            products: file.products,
            by_id,
        })
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.by_id.get(&id).and_then(|&i| self.products.get(i))
    }

    /// All products, in file order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog_json(products: &str) -> String {
        format!(r#"{{ "version": 1, "products": [{products}] }}"#)
    }

    fn product_json(id: i32, price: &str) -> String {
        format!(
            r#"{{
                "id": {id},
                "title": "Product {id}",
                "price": "{price}",
                "category": "kitchen",
                "image": "https://example.com/{id}.jpg",
                "rating": {{ "rate": 4.2, "count": 10 }}
            }}"#
        )
    }

    #[test]
    fn test_load_valid_catalog() {
        let json = catalog_json(&format!(
            "{},{}",
            product_json(1, "10.00"),
            product_json(2, "24.50")
        ));
        let catalog = Catalog::from_json(&json).unwrap();

        assert_eq!(catalog.all().len(), 2);
        assert!(catalog.get(ProductId::new(1)).is_some());
        assert!(catalog.get(ProductId::new(3)).is_none());
    }

    #[test]
    fn test_unsupported_version() {
        let json = r#"{ "version": 2, "products": [] }"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::UnsupportedVersion { found: 2 })
        ));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = catalog_json(&format!(
            "{},{}",
            product_json(1, "10.00"),
            product_json(1, "12.00")
        ));
        assert!(matches!(
            Catalog::from_json(&json),
            Err(CatalogError::DuplicateId(id)) if id == ProductId::new(1)
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let json = catalog_json(&product_json(1, "-1.00"));
        assert!(matches!(
            Catalog::from_json(&json),
            Err(CatalogError::NegativePrice(_))
        ));
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let json = catalog_json(
            r#"{
                "id": 1,
                "title": "Product 1",
                "price": "10.00",
                "category": "kitchen",
                "image": "https://example.com/1.jpg",
                "rating": { "rate": 5.5, "count": 10 }
            }"#,
        );
        assert!(matches!(
            Catalog::from_json(&json),
            Err(CatalogError::RatingOutOfRange(_))
        ));
    }

    #[test]
    fn test_bad_image_url_rejected() {
        let json = catalog_json(
            r#"{
                "id": 1,
                "title": "Product 1",
                "price": "10.00",
                "category": "kitchen",
                "image": "not a url",
                "rating": { "rate": 4.0, "count": 10 }
            }"#,
        );
        assert!(matches!(
            Catalog::from_json(&json),
            Err(CatalogError::InvalidImageUrl { .. })
        ));
    }
}
