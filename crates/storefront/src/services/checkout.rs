//! Checkout orchestration.
//!
//! Sequences a checkout: validate the billing form, charge the gateway,
//! snapshot the cart into an order record, persist it, clear the cart, and
//! hand the record back so the caller can navigate to the confirmation page.
//!
//! The orchestrator is a small state machine: `Idle -> Processing ->
//! Completed`, with `Failed` on a declined or unreachable gateway. The cart
//! is only cleared after the charge succeeds AND the order record is safely
//! persisted; any failure leaves the cart intact and the next submit retries
//! from the top.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use clementine_core::{BillingInfo, OrderNumber, OrderRecord};

use crate::storage::StorageError;

use super::cart::CartStore;
use super::orders::OrderRepository;
use super::payment::{ChargeRequest, PaymentError, PaymentGateway};
use super::pricing;

/// Where the orchestrator currently is in the checkout lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    /// No checkout in flight.
    Idle,
    /// A charge has been submitted to the gateway; cart mutations are
    /// rejected until it resolves.
    Processing,
    /// The last submit completed and wrote an order.
    Completed,
    /// The last submit failed; the cart is untouched and a new submit
    /// retries.
    Failed,
}

/// Errors a checkout attempt can surface.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to purchase.
    #[error("cart is empty")]
    EmptyCart,

    /// A submit is already in flight.
    #[error("a payment is already being processed")]
    AlreadyProcessing,

    /// A required billing field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The gateway declined or could not be reached.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The charge succeeded but the order could not be recorded.
    #[error("failed to record order: {0}")]
    Storage(#[from] StorageError),
}

/// Billing form fields, validated for presence only.
///
/// Card fields are used for the charge request and then dropped; only the
/// address-like fields are retained on the order record.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingForm {
    pub email: String,
    pub card_name: String,
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
}

impl BillingForm {
    /// Check that every field is non-blank. No semantic card validation.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingField` naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        require(&self.email, "email")?;
        require(&self.card_name, "cardholder name")?;
        require(&self.card_number, "card number")?;
        require(&self.expiry_date, "expiry date")?;
        require(&self.cvv, "cvv")?;
        require(&self.address, "address")?;
        require(&self.city, "city")?;
        require(&self.zip_code, "zip code")?;
        Ok(())
    }

    fn into_billing_info(self) -> BillingInfo {
        BillingInfo {
            email: self.email,
            address: self.address,
            city: self.city,
            zip_code: self.zip_code,
        }
    }
}

fn require(value: &str, field: &'static str) -> Result<(), CheckoutError> {
    if value.trim().is_empty() {
        return Err(CheckoutError::MissingField(field));
    }
    Ok(())
}

/// The checkout orchestrator.
pub struct CheckoutService {
    cart: Arc<CartStore>,
    orders: Arc<OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    state: Mutex<CheckoutState>,
}

impl CheckoutService {
    /// Create an orchestrator over the shared cart, order repository, and
    /// payment gateway.
    #[must_use]
    pub fn new(
        cart: Arc<CartStore>,
        orders: Arc<OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            cart,
            orders,
            gateway,
            state: Mutex::new(CheckoutState::Idle),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CheckoutState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: CheckoutState) {
        *self.lock_state() = state;
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        *self.lock_state()
    }

    /// Whether a charge is currently in flight.
    ///
    /// Cart mutation handlers consult this to reject changes mid-payment,
    /// mirroring the storefront's disabled controls.
    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.state() == CheckoutState::Processing
    }

    /// Run a checkout to completion.
    ///
    /// On success the cart has been cleared, the order persisted, and the
    /// returned record is what the confirmation page will display.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` on a blank billing field, an empty cart, a
    /// re-entrant submit, a gateway failure, or a failed order write. In
    /// every error case the cart is left exactly as it was.
    pub async fn submit(&self, billing: BillingForm) -> Result<OrderRecord, CheckoutError> {
        billing.validate()?;

        // Snapshot the cart under the state lock so the totals charged are
        // the totals recorded.
        let items = {
            let mut state = self.lock_state();
            if *state == CheckoutState::Processing {
                return Err(CheckoutError::AlreadyProcessing);
            }
            let items = self.cart.items();
            if items.is_empty() {
                return Err(CheckoutError::EmptyCart);
            }
            *state = CheckoutState::Processing;
            items
        };

        let totals = pricing::totals(&items);
        let request = ChargeRequest {
            amount: totals.total,
            card_name: billing.card_name.clone(),
            email: billing.email.clone(),
        };

        let receipt = match self.gateway.charge(&request).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::warn!("checkout payment failed: {e}");
                self.set_state(CheckoutState::Failed);
                return Err(e.into());
            }
        };

        let order = OrderRecord {
            order_number: OrderNumber::generate(&mut rand::rng()),
            items,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            tax: totals.tax,
            total: totals.total,
            date: Utc::now(),
            billing_info: billing.into_billing_info(),
        };

        if let Err(e) = self.orders.save(&order) {
            // The charge went through but we could not record it. Keep the
            // cart so nothing is lost and surface the failure.
            tracing::error!("failed to persist order after successful charge: {e}");
            self.set_state(CheckoutState::Failed);
            return Err(e.into());
        }

        self.cart.clear();
        self.set_state(CheckoutState::Completed);

        tracing::info!(
            order_number = %order.order_number,
            total = %order.total,
            transaction_id = %receipt.transaction_id,
            "checkout completed"
        );

        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tokio::sync::Notify;

    use clementine_core::{Product, ProductId, Rating};

    use crate::services::payment::PaymentReceipt;
    use crate::storage::{MemoryStorage, Storage, keys};

    use super::*;

    /// Gateway that approves instantly.
    struct ApprovingGateway;

    #[async_trait]
    impl PaymentGateway for ApprovingGateway {
        async fn charge(&self, request: &ChargeRequest) -> Result<PaymentReceipt, PaymentError> {
            Ok(PaymentReceipt {
                transaction_id: "txn-test".to_owned(),
                amount: request.amount,
                processed_at: Utc::now(),
            })
        }
    }

    /// Gateway that declines the first charge, then approves.
    struct FlakyGateway {
        failed_once: AtomicBool,
    }

    #[async_trait]
    impl PaymentGateway for FlakyGateway {
        async fn charge(&self, request: &ChargeRequest) -> Result<PaymentReceipt, PaymentError> {
            if self.failed_once.swap(true, Ordering::SeqCst) {
                Ok(PaymentReceipt {
                    transaction_id: "txn-retry".to_owned(),
                    amount: request.amount,
                    processed_at: Utc::now(),
                })
            } else {
                Err(PaymentError::Declined("insufficient funds".to_owned()))
            }
        }
    }

    /// Gateway that blocks until released, for observing the Processing state.
    struct BlockingGateway {
        release: Notify,
    }

    #[async_trait]
    impl PaymentGateway for BlockingGateway {
        async fn charge(&self, request: &ChargeRequest) -> Result<PaymentReceipt, PaymentError> {
            self.release.notified().await;
            Ok(PaymentReceipt {
                transaction_id: "txn-blocked".to_owned(),
                amount: request.amount,
                processed_at: Utc::now(),
            })
        }
    }

    fn product(id: i32, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: price.parse().unwrap(),
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

    fn billing() -> BillingForm {
        BillingForm {
            email: "jo@example.com".to_owned(),
            card_name: "Jo Customer".to_owned(),
            card_number: "4242 4242 4242 4242".to_owned(),
            expiry_date: "12/28".to_owned(),
            cvv: "123".to_owned(),
            address: "12 Orchard Lane".to_owned(),
            city: "Portland".to_owned(),
            zip_code: "97201".to_owned(),
        }
    }

    fn harness(gateway: Arc<dyn PaymentGateway>) -> (Arc<CartStore>, Arc<OrderRepository>, CheckoutService) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let cart = Arc::new(CartStore::load(Arc::clone(&storage)));
        let orders = Arc::new(OrderRepository::new(storage));
        let service = CheckoutService::new(Arc::clone(&cart), Arc::clone(&orders), gateway);
        (cart, orders, service)
    }

    #[tokio::test]
    async fn test_successful_checkout_empties_cart_and_records_order() {
        let (cart, orders, service) = harness(Arc::new(ApprovingGateway));
        cart.add_item(&product(1, "10.00"), 1);

        let order = service.submit(billing()).await.unwrap();

        assert!(cart.is_empty());
        assert_eq!(service.state(), CheckoutState::Completed);
        assert_eq!(order.subtotal, "10.00".parse::<Decimal>().unwrap());
        assert_eq!(order.shipping, "5.99".parse::<Decimal>().unwrap());
        assert_eq!(order.tax, "1.00".parse::<Decimal>().unwrap());
        assert_eq!(order.total, "16.99".parse::<Decimal>().unwrap());
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product.id, ProductId::new(1));

        let read = orders.last_order().unwrap();
        assert_eq!(read.order_number, order.order_number);
        assert_eq!(read.total, order.total);
    }

    #[tokio::test]
    async fn test_order_snapshot_is_independent_of_later_mutations() {
        let (cart, orders, service) = harness(Arc::new(ApprovingGateway));
        cart.add_item(&product(1, "10.00"), 2);

        service.submit(billing()).await.unwrap();
        cart.add_item(&product(2, "99.00"), 1);

        let read = orders.last_order().unwrap();
        assert_eq!(read.items.len(), 1);
        assert_eq!(read.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let (_, _, service) = harness(Arc::new(ApprovingGateway));
        let result = service.submit(billing()).await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert_eq!(service.state(), CheckoutState::Idle);
    }

    #[tokio::test]
    async fn test_blank_field_is_rejected_before_charging() {
        let (cart, orders, service) = harness(Arc::new(ApprovingGateway));
        cart.add_item(&product(1, "10.00"), 1);

        let mut form = billing();
        form.email = "   ".to_owned();

        let result = service.submit(form).await;
        assert!(matches!(result, Err(CheckoutError::MissingField("email"))));
        assert_eq!(service.state(), CheckoutState::Idle);
        assert!(!cart.is_empty());
        assert!(orders.last_order().is_none());
    }

    #[tokio::test]
    async fn test_declined_payment_keeps_cart_and_allows_retry() {
        let gateway = Arc::new(FlakyGateway {
            failed_once: AtomicBool::new(false),
        });
        let (cart, orders, service) = harness(gateway);
        cart.add_item(&product(1, "10.00"), 1);

        let first = service.submit(billing()).await;
        assert!(matches!(
            first,
            Err(CheckoutError::Payment(PaymentError::Declined(_)))
        ));
        assert_eq!(service.state(), CheckoutState::Failed);
        assert!(!cart.is_empty(), "cart must survive a declined payment");
        assert!(orders.last_order().is_none());

        let second = service.submit(billing()).await;
        assert!(second.is_ok());
        assert!(cart.is_empty());
        assert_eq!(service.state(), CheckoutState::Completed);
    }

    #[tokio::test]
    async fn test_reentrant_submit_is_rejected_while_processing() {
        let gateway = Arc::new(BlockingGateway {
            release: Notify::new(),
        });
        let (cart, _, service) = harness(Arc::clone(&gateway) as Arc<dyn PaymentGateway>);
        cart.add_item(&product(1, "10.00"), 1);

        let service = Arc::new(service);
        let first = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.submit(billing()).await }
        });

        // Let the first submit reach the gateway.
        for _ in 0..50 {
            if service.is_processing() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(service.is_processing());

        let second = service.submit(billing()).await;
        assert!(matches!(second, Err(CheckoutError::AlreadyProcessing)));

        gateway.release.notify_one();
        let first = first.await.unwrap();
        assert!(first.is_ok());
    }

    #[tokio::test]
    async fn test_order_number_shape() {
        let (cart, _, service) = harness(Arc::new(ApprovingGateway));
        cart.add_item(&product(1, "10.00"), 1);

        let order = service.submit(billing()).await.unwrap();
        assert!(OrderNumber::parse(order.order_number.as_str()).is_ok());
    }
}
