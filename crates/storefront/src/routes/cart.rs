//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation answers with a fragment and an `HX-Trigger: cart-updated`
//! header so the count badge elsewhere on the page refreshes itself.
//!
//! While a payment is in flight the cart is read-only: mutation handlers
//! return 409 instead of touching state, mirroring the disabled controls on
//! the payment form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use clementine_core::{CartLineItem, ProductId};

use crate::filters;
use crate::state::AppState;

use super::format_price;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i32,
    pub title: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            id: line.product.id.as_i32(),
            title: line.product.title.clone(),
            image: line.product.image.clone(),
            quantity: line.quantity,
            price: format_price(line.product.price),
            line_total: format_price(line.line_total()),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u64,
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl CartView {
    /// Build the display view from the shared cart store.
    pub fn from_state(state: &AppState) -> Self {
        let items = state.cart().items();
        let totals = state.cart().totals();

        Self {
            item_count: items.iter().map(|l| u64::from(l.quantity)).sum(),
            items: items.iter().map(CartItemView::from).collect(),
            subtotal: format_price(totals.subtotal),
            shipping: format_price(totals.shipping),
            tax: format_price(totals.tax),
            total: format_price(totals.total),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// 409 response used while a payment is in flight.
fn cart_locked() -> Response {
    (
        StatusCode::CONFLICT,
        Html("<span class=\"cart-error\">Cart is locked while payment is processing</span>"),
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    CartShowTemplate {
        cart: CartView::from_state(&state),
    }
}

/// Add item to cart (HTMX).
///
/// Returns the refreshed count badge with an HTMX trigger so other cart
/// fragments update themselves.
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddToCartForm>) -> Response {
    if state.checkout().is_processing() {
        return cart_locked();
    }

    let Some(product) = state.catalog().get(ProductId::new(form.product_id)) else {
        return (
            StatusCode::NOT_FOUND,
            Html("<span class=\"cart-error\">Unknown product</span>"),
        )
            .into_response();
    };

    state.cart().add_item(product, form.quantity.unwrap_or(1));

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: state.cart().total_items(),
        },
    )
        .into_response()
}

/// Set a line's quantity (HTMX). Zero or less removes the line.
#[instrument(skip(state))]
pub async fn update(State(state): State<AppState>, Form(form): Form<UpdateCartForm>) -> Response {
    if state.checkout().is_processing() {
        return cart_locked();
    }

    state
        .cart()
        .update_quantity(ProductId::new(form.product_id), form.quantity);

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from_state(&state),
        },
    )
        .into_response()
}

/// Remove item from cart (HTMX).
#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Form(form): Form<RemoveFromCartForm>) -> Response {
    if state.checkout().is_processing() {
        return cart_locked();
    }

    state.cart().remove_item(ProductId::new(form.product_id));

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from_state(&state),
        },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    CartCountTemplate {
        count: state.cart().total_items(),
    }
}
