//! Payment gateway seam.
//!
//! Checkout talks to an abstract [`PaymentGateway`] so the orchestrator's
//! state machine is independent of how a charge actually happens. The
//! bundled [`SimulatedGateway`] approves every charge after a configurable
//! delay; tests inject instant approve/decline stubs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::distr::{Alphanumeric, SampleString};
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::time::Duration;

/// Errors a payment attempt can surface.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The processor refused the charge.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The processor could not be reached.
    #[error("payment network error: {0}")]
    Network(String),
}

/// A charge to submit to the gateway.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Amount to charge, in USD.
    pub amount: Decimal,
    /// Cardholder name, as entered.
    pub card_name: String,
    /// Contact email for the receipt.
    pub email: String,
}

/// Proof of a successful charge.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    /// Processor-assigned transaction id.
    pub transaction_id: String,
    /// Amount actually charged.
    pub amount: Decimal,
    /// When the processor confirmed the charge.
    pub processed_at: DateTime<Utc>,
}

/// An asynchronous payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submit a charge.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] if the charge is declined or the processor
    /// is unreachable.
    async fn charge(&self, request: &ChargeRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// Gateway that approves every charge after a fixed delay.
///
/// Stands in for a real processor: the delay models network and processing
/// latency so the rest of the flow (disabled resubmission, the Processing
/// state) behaves as it would in production.
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    /// Create a gateway with the given simulated latency.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<PaymentReceipt, PaymentError> {
        tokio::time::sleep(self.delay).await;

        let transaction_id = Alphanumeric.sample_string(&mut rand::rng(), 16);
        tracing::info!(%transaction_id, amount = %request.amount, "simulated charge approved");

        Ok(PaymentReceipt {
            transaction_id,
            amount: request.amount,
            processed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_gateway_approves() {
        let gateway = SimulatedGateway::new(Duration::ZERO);
        let receipt = gateway
            .charge(&ChargeRequest {
                amount: "16.99".parse().unwrap(),
                card_name: "Jo Customer".to_owned(),
                email: "jo@example.com".to_owned(),
            })
            .await
            .unwrap();

        assert_eq!(receipt.amount, "16.99".parse().unwrap());
        assert_eq!(receipt.transaction_id.len(), 16);
    }
}
