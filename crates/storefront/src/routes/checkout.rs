//! Checkout route handlers.
//!
//! The payment form posts as a regular form submission (not HTMX): success
//! redirects to the confirmation page, failure re-renders the form with a
//! message and the cart untouched.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use clementine_core::OrderRecord;

use crate::error::Result;
use crate::filters;
use crate::services::checkout::{BillingForm, CheckoutError};
use crate::services::payment::PaymentError;
use crate::state::AppState;

use super::cart::{CartItemView, CartView};
use super::format_price;

/// Completed order display data for the confirmation page.
#[derive(Clone)]
pub struct OrderView {
    pub order_number: String,
    pub date: String,
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
}

impl From<&OrderRecord> for OrderView {
    fn from(order: &OrderRecord) -> Self {
        Self {
            order_number: order.order_number.to_string(),
            date: order.date.format("%B %d, %Y %H:%M UTC").to_string(),
            items: order.items.iter().map(CartItemView::from).collect(),
            subtotal: format_price(order.subtotal),
            shipping: format_price(order.shipping),
            tax: format_price(order.tax),
            total: format_price(order.total),
            email: order.billing_info.email.clone(),
            address: order.billing_info.address.clone(),
            city: order.billing_info.city.clone(),
            zip_code: order.billing_info.zip_code.clone(),
        }
    }
}

/// Payment form page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub order: OrderView,
}

/// Display the payment form.
///
/// An empty cart with no payment in flight redirects back to the cart page;
/// there is nothing to purchase.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Response {
    if state.cart().is_empty() && !state.checkout().is_processing() {
        return Redirect::to("/cart").into_response();
    }

    CheckoutShowTemplate {
        cart: CartView::from_state(&state),
        error: None,
    }
    .into_response()
}

/// Submit the payment form.
#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<BillingForm>,
) -> Result<Response> {
    match state.checkout().submit(form).await {
        Ok(_) => Ok(Redirect::to("/checkout/confirmation").into_response()),
        Err(CheckoutError::EmptyCart) => Ok(Redirect::to("/cart").into_response()),
        // A concurrent submit slipped past the disabled button; 409 it.
        Err(e @ CheckoutError::AlreadyProcessing) => Err(e.into()),
        Err(e) => Ok(CheckoutShowTemplate {
            cart: CartView::from_state(&state),
            error: Some(user_message(&e)),
        }
        .into_response()),
    }
}

/// Display the order confirmation page.
///
/// Without an order to confirm, there is nothing to show: redirect home.
#[instrument(skip(state))]
pub async fn confirmation(State(state): State<AppState>) -> Response {
    match state.orders().last_order() {
        Some(order) => ConfirmationTemplate {
            order: OrderView::from(&order),
        }
        .into_response(),
        None => Redirect::to("/").into_response(),
    }
}

/// Map a checkout failure to a message safe to show the customer.
fn user_message(error: &CheckoutError) -> String {
    match error {
        CheckoutError::MissingField(field) => format!("Please fill in your {field}."),
        CheckoutError::Payment(PaymentError::Declined(_)) => {
            "Your payment was declined. Please check your card details and try again.".to_owned()
        }
        CheckoutError::Payment(PaymentError::Network(_)) => {
            "We couldn't reach the payment processor. Your card was not charged; please try again."
                .to_owned()
        }
        _ => "We couldn't complete your order. Please try again.".to_owned(),
    }
}
