//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::services::{CartStore, CheckoutService, OrderRepository, PaymentGateway};
use crate::storage::Storage;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, the shared cart store, and the checkout orchestrator. There is
/// exactly one `CartStore` per process; handlers never hold their own copy
/// of cart state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    cart: Arc<CartStore>,
    orders: Arc<OrderRepository>,
    checkout: CheckoutService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Loads any persisted cart from `storage` and wires the checkout
    /// orchestrator to the given payment gateway.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Catalog,
        storage: Arc<dyn Storage>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let cart = Arc::new(CartStore::load(Arc::clone(&storage)));
        let orders = Arc::new(OrderRepository::new(storage));
        let checkout = CheckoutService::new(Arc::clone(&cart), Arc::clone(&orders), gateway);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
                orders,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the shared cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the order repository.
    #[must_use]
    pub fn orders(&self) -> &OrderRepository {
        &self.inner.orders
    }

    /// Get a reference to the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}
