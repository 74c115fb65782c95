//! Order record persistence.
//!
//! A single-slot repository over durable storage: checkout writes the
//! completed order (replacing any previous one), and the confirmation page
//! reads it back. The record is never cleared by reading, so a customer can
//! revisit the confirmation until the next order overwrites it.

use std::sync::Arc;

use clementine_core::OrderRecord;

use crate::storage::{Storage, StorageError, keys};

/// Repository for the most recent order.
pub struct OrderRepository {
    storage: Arc<dyn Storage>,
}

impl OrderRepository {
    /// Create a repository over the given storage.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Persist an order, replacing any previously stored one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be serialized or written.
    pub fn save(&self, order: &OrderRecord) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(order)?;
        self.storage.put(keys::LAST_ORDER, &serialized)
    }

    /// Read the most recent order, if one exists.
    ///
    /// An unreadable or unparsable record is logged and reported as absent;
    /// the caller's redirect-away behavior covers both cases.
    #[must_use]
    pub fn last_order(&self) -> Option<OrderRecord> {
        let raw = match self.storage.get(keys::LAST_ORDER) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("failed to read last order: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(order) => Some(order),
            Err(e) => {
                tracing::warn!("discarding unparsable last order: {e}");
                None
            }
        }
    }
}
