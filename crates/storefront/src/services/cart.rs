//! Cart store: single source of truth for the active cart.
//!
//! The store owns the ordered line-item collection for the lifetime of the
//! process, loads previously persisted state at startup, and re-persists the
//! full collection after every mutation. All consumers share one store
//! through `AppState`; nothing holds an independent copy.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;

use clementine_core::{CartLineItem, CartTotals, Product, ProductId};

use crate::storage::{Storage, keys};

use super::pricing;

/// The shared cart store.
pub struct CartStore {
    storage: Arc<dyn Storage>,
    items: Mutex<Vec<CartLineItem>>,
}

impl CartStore {
    /// Create a store, loading any previously persisted cart.
    ///
    /// A missing or unreadable persisted cart is treated as empty; corrupt
    /// data is logged and discarded rather than surfaced.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let items = match storage.get(keys::CART) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartLineItem>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("discarding unparsable persisted cart: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("failed to read persisted cart, starting empty: {e}");
                Vec::new()
            }
        };

        Self {
            storage,
            items: Mutex::new(items),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CartLineItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `quantity` units of a product.
    ///
    /// If the product is already in the cart its quantity is incremented;
    /// otherwise a new line is appended. A `quantity` of 0 is normalized
    /// to 1. Always succeeds.
    pub fn add_item(&self, product: &Product, quantity: u32) {
        let quantity = quantity.max(1);
        let mut items = self.lock();

        if let Some(line) = items.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            items.push(CartLineItem::new(product.clone(), quantity));
        }

        self.persist(&items);
    }

    /// Set the quantity of a line to exactly `quantity`.
    ///
    /// A quantity of zero or less removes the line. Unknown ids are a no-op.
    pub fn update_quantity(&self, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let mut items = self.lock();
        if let Some(line) = items.iter_mut().find(|l| l.product.id == id) {
            line.quantity = quantity;
            self.persist(&items);
        }
    }

    /// Remove the line for `id`, if present. Unknown ids are a no-op.
    pub fn remove_item(&self, id: ProductId) {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|l| l.product.id != id);
        if items.len() != before {
            self.persist(&items);
        }
    }

    /// Empty the cart.
    pub fn clear(&self) {
        let mut items = self.lock();
        items.clear();
        self.persist(&items);
    }

    /// Snapshot of the current line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.lock().clone()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lock().iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lock().iter().map(CartLineItem::line_total).sum()
    }

    /// Derived subtotal/shipping/tax/total for the current lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        pricing::totals(&self.lock())
    }

    /// Persist the full collection under the cart key.
    ///
    /// Mutations are contractually infallible, so a failed write is logged
    /// (and reaches Sentry through the tracing integration) without failing
    /// the mutation; the in-memory cart remains authoritative.
    fn persist(&self, items: &[CartLineItem]) {
        let serialized = match serde_json::to_string(items) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("failed to serialize cart: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.put(keys::CART, &serialized) {
            tracing::error!("failed to persist cart: {e}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clementine_core::Rating;

    use crate::storage::MemoryStorage;

    use super::*;

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

    fn store() -> (Arc<MemoryStorage>, CartStore) {
        let storage = Arc::new(MemoryStorage::new());
        let cart = CartStore::load(Arc::clone(&storage) as Arc<dyn Storage>);
        (storage, cart)
    }

    #[test]
    fn test_add_new_item_appends() {
        let (_, cart) = store();
        cart.add_item(&product(1, "10.00"), 1);
        cart.add_item(&product(2, "5.00"), 2);

        let items = cart.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product.id, ProductId::new(1));
        assert_eq!(items[1].quantity, 2);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn test_add_same_id_increments_single_line() {
        let (_, cart) = store();
        cart.add_item(&product(1, "10.00"), 1);
        cart.add_item(&product(1, "10.00"), 1);

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(cart.subtotal(), "20.00".parse().unwrap());
    }

    #[test]
    fn test_add_bulk_quantity() {
        let (_, cart) = store();
        cart.add_item(&product(1, "10.00"), 3);
        cart.add_item(&product(1, "10.00"), 4);
        assert_eq!(cart.items()[0].quantity, 7);
    }

    #[test]
    fn test_add_zero_quantity_normalizes_to_one() {
        let (_, cart) = store();
        cart.add_item(&product(1, "10.00"), 0);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_update_quantity_sets_absolute_value() {
        let (_, cart) = store();
        cart.add_item(&product(1, "10.00"), 5);
        cart.update_quantity(ProductId::new(1), 2);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let (_, cart) = store();
        cart.add_item(&product(1, "10.00"), 2);
        cart.update_quantity(ProductId::new(1), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_to_negative_removes_line() {
        let (_, cart) = store();
        cart.add_item(&product(1, "10.00"), 2);
        cart.update_quantity(ProductId::new(1), -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let (_, cart) = store();
        cart.add_item(&product(1, "10.00"), 1);
        cart.update_quantity(ProductId::new(99), 5);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let (_, cart) = store();
        cart.add_item(&product(1, "10.00"), 1);
        cart.remove_item(ProductId::new(99));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_clear_empties_and_persists() {
        let (storage, cart) = store();
        cart.add_item(&product(1, "10.00"), 1);
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(storage.get(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_cart_survives_reload_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let cart = CartStore::load(Arc::clone(&storage) as Arc<dyn Storage>);
            cart.add_item(&product(1, "10.00"), 2);
        }

        let reloaded = CartStore::load(Arc::clone(&storage) as Arc<dyn Storage>);
        let items = reloaded.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.id, ProductId::new(1));
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_corrupt_persisted_cart_recovers_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.put(keys::CART, "{not json").unwrap();

        let cart = CartStore::load(Arc::clone(&storage) as Arc<dyn Storage>);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_track_current_state() {
        let (_, cart) = store();
        cart.add_item(&product(1, "10.00"), 1);

        let t = cart.totals();
        assert_eq!(t.subtotal, "10.00".parse().unwrap());
        assert_eq!(t.shipping, "5.99".parse().unwrap());
        assert_eq!(t.tax, "1.00".parse().unwrap());
        assert_eq!(t.total, "16.99".parse().unwrap());

        cart.clear();
        assert_eq!(cart.totals(), CartTotals::ZERO);
    }
}
