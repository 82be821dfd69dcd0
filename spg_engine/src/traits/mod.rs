//! # Backend interfaces
//!
//! The engine never talks to a database or a remote service directly. Everything it needs from the outside world is
//! described by one of the traits in this module, and injected into the APIs that need it.
//!
//! * [`BasketManagement`] reads and updates baskets and their lines.
//! * [`ProcessorResponseManagement`] maintains the payment processor audit trail. The audit trail doubles as the
//!   correlation table between the gateway's merchant order numbers and our baskets.
//! * [`OrderPlacement`] turns a paid basket into an order, atomically.
//! * [`PaymentGatewayDatabase`] bundles the three into a single backend.
//! * [`CreditCloser`] and [`BundleCatalog`] abstract over the Spgateway CreditClose API and the journal bundle catalog.
mod basket_management;
mod gateway_clients;
mod order_placement;
mod payment_gateway_database;
mod processor_responses;

pub use basket_management::BasketManagement;
pub use gateway_clients::{BundleCatalog, CreditCloser};
pub use order_placement::OrderPlacement;
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
pub use processor_responses::ProcessorResponseManagement;
