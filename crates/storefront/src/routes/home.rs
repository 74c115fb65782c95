//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use clementine_core::Product;

use crate::filters;
use crate::state::AppState;

use super::format_price;

/// Product display data for the grid.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub image: String,
    pub price: String,
    pub original_price: Option<String>,
    pub rating: String,
    pub rating_count: u32,
    pub in_stock: bool,
    pub on_sale: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            title: product.title.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            price: format_price(product.price),
            original_price: product.original_price.map(format_price),
            rating: format!("{:.1}", product.rating.rate),
            rating_count: product.rating.count,
            in_stock: product.in_stock,
            on_sale: product.on_sale,
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductCardView>,
}

/// Display the home page: the product grid, featured products first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let mut products: Vec<&Product> = state.catalog().all().iter().collect();
    products.sort_by_key(|p| !p.featured);

    HomeTemplate {
        products: products.into_iter().map(ProductCardView::from).collect(),
    }
}
