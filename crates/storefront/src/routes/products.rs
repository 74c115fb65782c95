//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use clementine_core::{Product, ProductId};

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

use super::format_price;

/// Product display data for the detail page.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub price: String,
    pub original_price: Option<String>,
    pub rating: String,
    pub rating_count: u32,
    pub in_stock: bool,
    pub stock: Option<u32>,
    pub brand: Option<String>,
    pub tags: Vec<String>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            title: product.title.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            price: format_price(product.price),
            original_price: product.original_price.map(format_price),
            rating: format!("{:.1}", product.rating.rate),
            rating_count: product.rating.count,
            in_stock: product.in_stock,
            stock: product.stock,
            brand: product.brand.clone(),
            tags: product.tags.clone(),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
}

/// Display a product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ProductShowTemplate> {
    let product = state
        .catalog()
        .get(ProductId::new(id))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductShowTemplate {
        product: ProductDetailView::from(product),
    })
}
