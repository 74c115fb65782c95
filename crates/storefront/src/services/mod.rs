//! Application services: the cart store, pricing, payment, checkout, and
//! order persistence.

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod payment;
pub mod pricing;

pub use cart::CartStore;
pub use checkout::{BillingForm, CheckoutError, CheckoutService, CheckoutState};
pub use orders::OrderRepository;
pub use payment::{PaymentGateway, SimulatedGateway};
